//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for schopt commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// Schopt CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "schopt")]
#[command(about = "Normalizes and optimizes Schematron rule documents")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available schopt subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Optimize a single Schematron document
    Optimize {
        /// The Schematron source document
        source: PathBuf,

        /// The optimized document to write
        destination: PathBuf,

        /// Keep only asserts/reports with this role (drops 'let' and
        /// 'extends' children as a side effect)
        #[arg(long)]
        keep_role: Option<String>,

        /// TOML file configuring the substitution rewrite hook
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Convert a directory of Schematron documents, producing an unfiltered
    /// and a role-filtered variant of each
    Convert {
        /// Directory holding the source documents
        input_dir: PathBuf,

        /// Directory to write the optimized documents to
        output_dir: PathBuf,

        /// Document stems to convert (defaults to every *.sch directly in
        /// INPUT_DIR); repeat the flag for several stems
        #[arg(long)]
        stems: Vec<String>,

        /// Role kept in the filtered variant
        #[arg(long, default_value = "error")]
        keep_role: String,

        /// TOML file configuring the substitution rewrite hook
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,

        /// Name of the include directory copied alongside the documents
        #[arg(long, default_value = "include")]
        include_dir: String,
    },
}
