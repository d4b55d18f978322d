//! Optimize command implementation
//!
//! Runs a single Schematron document through the pipeline: parse the source
//! and its includes, apply the configured rewrite hooks, optimize (guard
//! forcing, optional role filtering, path rewriting) and write the
//! self-contained result.

use crate::cli::common::{EXIT_ERROR, EXIT_FAILED, EXIT_SUCCESS, optimize_document,
    load_transformers};
use std::path::Path;

/// Run the optimize command
///
/// # Returns
///
/// Exit code:
/// - 0: the optimized document was written
/// - 1: the document failed to parse, optimize or write
/// - 2: the rewrite-hook configuration could not be loaded
pub fn run_optimize(
    source: &Path,
    destination: &Path,
    keep_role: Option<&str>,
    rules: Option<&Path>,
) -> i32 {
    let transformers = match load_transformers(rules) {
        Ok(transformers) => transformers,
        Err(error) => {
            eprintln!("Error: {error}");
            return EXIT_ERROR;
        }
    };

    match optimize_document(source, destination, &transformers, keep_role) {
        Ok(()) => {
            eprintln!(
                "Optimized {} -> {}",
                source.display(),
                destination.display()
            );
            EXIT_SUCCESS
        }
        Err(error) => {
            eprintln!("Error: {error}");
            EXIT_FAILED
        }
    }
}
