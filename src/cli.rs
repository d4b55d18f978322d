//! CLI argument parsing and command dispatch

pub mod args;
pub mod common;
pub mod convert;
pub mod optimize;

// Re-export types for convenient access
pub use args::{Cli, Command, OutputFormat};
