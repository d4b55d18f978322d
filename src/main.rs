#![forbid(unsafe_code)]

//! Schopt CLI entry point

use clap::Parser;
use schopt::cli::convert::ConvertOptions;
use schopt::cli::{Cli, Command};
use std::process;

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Optimize {
            source,
            destination,
            keep_role,
            rules,
        } => schopt::cli::optimize::run_optimize(
            &source,
            &destination,
            keep_role.as_deref(),
            rules.as_deref(),
        ),
        Command::Convert {
            input_dir,
            output_dir,
            stems,
            keep_role,
            rules,
            format,
            include_dir,
        } => schopt::cli::convert::run_convert(
            &input_dir,
            &output_dir,
            &ConvertOptions {
                stems: &stems,
                keep_role: &keep_role,
                rules: rules.as_deref(),
                format,
                include_dir: &include_dir,
            },
        ),
    };

    process::exit(exit_code);
}
