//! Convert command implementation
//!
//! The batch driver: for every source stem in the input directory, produce
//! two optimized documents in the output directory — `<stem>-all.sch`
//! (unfiltered) and `<stem>-<role>.sch` (role-filtered). The input's include
//! directory is copied alongside first; afterwards, copied include files not
//! referenced by any produced document are deleted again. Documents are
//! independent, so stems are converted in parallel.

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_ERROR, EXIT_FAILED, EXIT_SUCCESS, load_transformers,
    optimize_document};
use crate::transform::DefinitionTransformer;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for the convert command
pub struct ConvertOptions<'a> {
    /// Explicit stems to convert; empty means every `*.sch` in the input
    /// directory
    pub stems: &'a [String],

    /// Role kept in the filtered variant
    pub keep_role: &'a str,

    /// Rewrite-hook configuration file
    pub rules: Option<&'a Path>,

    /// Output format
    pub format: OutputFormat,

    /// Name of the include directory
    pub include_dir: &'a str,
}

/// The outcome of producing one output document
#[derive(Debug, Serialize)]
struct DocumentOutcome {
    #[serde(rename = "type")]
    record_type: &'static str,
    stem: String,
    destination: PathBuf,
    role: Option<String>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Final status record for JSONL output
#[derive(Debug, Serialize)]
struct StatusRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    converted: usize,
    failed: usize,
}

/// Run the convert command
///
/// # Returns
///
/// Exit code:
/// - 0: every document was converted
/// - 1: at least one document failed
/// - 2: usage or environment error (unreadable input directory, bad hook
///   configuration)
pub fn run_convert(input_dir: &Path, output_dir: &Path, options: &ConvertOptions) -> i32 {
    if !input_dir.is_dir() {
        eprintln!("Error: input directory {} not found", input_dir.display());
        return EXIT_ERROR;
    }
    if let Err(error) = fs::create_dir_all(output_dir) {
        eprintln!("Error: cannot create {}: {error}", output_dir.display());
        return EXIT_ERROR;
    }

    let transformers = match load_transformers(options.rules) {
        Ok(transformers) => transformers,
        Err(error) => {
            eprintln!("Error: {error}");
            return EXIT_ERROR;
        }
    };

    let stems = if options.stems.is_empty() {
        match discover_stems(input_dir) {
            Ok(stems) => stems,
            Err(error) => {
                eprintln!("Error: cannot read {}: {error}", input_dir.display());
                return EXIT_ERROR;
            }
        }
    } else {
        options.stems.to_vec()
    };

    if stems.is_empty() {
        eprintln!("Warning: no Schematron documents found in {}", input_dir.display());
        return EXIT_SUCCESS;
    }

    if options.format == OutputFormat::Human {
        eprintln!("Converting {} documents...", stems.len());
    }

    if let Err(error) = copy_includes(input_dir, output_dir, options.include_dir) {
        eprintln!("Error: cannot copy includes: {error}");
        return EXIT_ERROR;
    }

    let outcomes: Vec<DocumentOutcome> = stems
        .par_iter()
        .flat_map_iter(|stem| {
            convert_stem(stem, input_dir, output_dir, &transformers, options.keep_role)
        })
        .collect();

    if let Err(error) = clean_includes(output_dir, options.include_dir) {
        eprintln!("Warning: cannot clean includes: {error}");
    }

    let failed = outcomes.iter().filter(|outcome| outcome.error.is_some()).count();
    let converted = outcomes.len() - failed;

    match options.format {
        OutputFormat::Human => print_human_output(&outcomes),
        OutputFormat::Jsonl => print_jsonl_output(&outcomes, converted, failed),
    }

    if failed > 0 { EXIT_FAILED } else { EXIT_SUCCESS }
}

/// Converts one stem into its two output documents
fn convert_stem(
    stem: &str,
    input_dir: &Path,
    output_dir: &Path,
    transformers: &[Box<dyn DefinitionTransformer>],
    keep_role: &str,
) -> Vec<DocumentOutcome> {
    let source = input_dir.join(format!("{stem}.sch"));
    let variants = [
        (None, output_dir.join(format!("{stem}-all.sch"))),
        (
            Some(keep_role.to_string()),
            output_dir.join(format!("{stem}-{keep_role}.sch")),
        ),
    ];

    variants
        .into_iter()
        .map(|(role, destination)| {
            let result =
                optimize_document(&source, &destination, transformers, role.as_deref());
            DocumentOutcome {
                record_type: "document",
                stem: stem.to_string(),
                destination,
                role,
                status: if result.is_ok() { "ok" } else { "failed" },
                error: result.err().map(|error| error.to_string()),
            }
        })
        .collect()
}

/// Lists the stems of every `*.sch` file directly inside the input directory
fn discover_stems(input_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut stems = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file()
            && path.extension().is_some_and(|extension| extension == "sch")
            && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
        {
            stems.push(stem.to_string());
        }
    }
    stems.sort();
    Ok(stems)
}

/// Copies the input's include directory flat into the output directory
///
/// A missing include directory is not an error; documents without value-set
/// includes simply have nothing to copy.
fn copy_includes(input_dir: &Path, output_dir: &Path, include_dir: &str) -> std::io::Result<()> {
    let source_dir = input_dir.join(include_dir);
    if !source_dir.is_dir() {
        return Ok(());
    }

    let destination_dir = output_dir.join(include_dir);
    fs::create_dir_all(&destination_dir)?;
    for entry in fs::read_dir(&source_dir)? {
        let path = entry?.path();
        if path.is_file()
            && let Some(file_name) = path.file_name()
        {
            fs::copy(&path, destination_dir.join(file_name))?;
        }
    }
    Ok(())
}

/// Deletes copied include files that no produced document references
///
/// The reference scan is textual: an include file is kept as soon as its
/// name appears anywhere in one of the emitted `.sch` documents.
fn clean_includes(output_dir: &Path, include_dir: &str) -> std::io::Result<()> {
    let include_path = output_dir.join(include_dir);
    if !include_path.is_dir() {
        return Ok(());
    }

    let mut document_contents = Vec::new();
    for entry in fs::read_dir(output_dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|extension| extension == "sch") {
            document_contents.push(fs::read_to_string(&path)?);
        }
    }

    for entry in fs::read_dir(&include_path)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let referenced = document_contents
            .iter()
            .any(|content| content.contains(file_name));
        if !referenced {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Print human-readable output
fn print_human_output(outcomes: &[DocumentOutcome]) {
    for outcome in outcomes {
        match &outcome.error {
            None => println!("ok     {}", outcome.destination.display()),
            Some(error) => println!("failed {}: {error}", outcome.destination.display()),
        }
    }
}

/// Print JSONL output: one record per document, then a status record
fn print_jsonl_output(outcomes: &[DocumentOutcome], converted: usize, failed: usize) {
    for outcome in outcomes {
        if let Ok(line) = serde_json::to_string(outcome) {
            println!("{line}");
        }
    }
    let status = StatusRecord {
        record_type: "status",
        converted,
        failed,
    };
    if let Ok(line) = serde_json::to_string(&status) {
        println!("{line}");
    }
}
