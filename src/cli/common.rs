//! Common helper functions shared across CLI commands
//!
//! This module provides the exit-code constants, rewrite-hook loading and
//! the single-document pipeline driver shared by the `optimize` and
//! `convert` commands.

use crate::error::{SchoptError, TransformError};
use crate::transform::{self, DefinitionTransformer, SubstitutionTransformer};
use crate::{optimizer, parser, writer};
use std::path::Path;

/// Exit codes shared by all commands
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Loads the rewrite hooks configured for this run
///
/// Currently a single optional substitution hook loaded from `--rules`; the
/// returned slice preserves the order hooks must be applied in.
///
/// # Errors
///
/// Returns `TransformError` if the configuration file cannot be loaded.
pub(crate) fn load_transformers(
    rules: Option<&Path>,
) -> Result<Vec<Box<dyn DefinitionTransformer>>, TransformError> {
    let mut transformers: Vec<Box<dyn DefinitionTransformer>> = Vec::new();
    if let Some(path) = rules {
        transformers.push(Box::new(SubstitutionTransformer::from_path(path)?));
    }
    Ok(transformers)
}

/// Runs one document through the whole pipeline:
/// parse, rewrite hooks, optimize, write
///
/// # Errors
///
/// Propagates the first failing stage's error; nothing is written to the
/// destination on failure.
pub(crate) fn optimize_document(
    source: &Path,
    destination: &Path,
    transformers: &[Box<dyn DefinitionTransformer>],
    role_to_keep: Option<&str>,
) -> Result<(), SchoptError> {
    let mut definition = parser::parse_file(source)?;
    transform::apply_all(&mut definition, transformers);
    optimizer::optimize(&mut definition, role_to_keep)?;
    writer::write(&definition, destination)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_transformers_without_rules_is_empty() {
        let transformers = load_transformers(None).unwrap();
        assert!(transformers.is_empty());
    }

    #[test]
    fn test_load_transformers_missing_file() {
        let result = load_transformers(Some(Path::new("/nonexistent/hooks.toml")));
        assert!(matches!(result, Err(TransformError::Io { .. })));
    }

    #[test]
    fn test_optimize_document_missing_source() {
        let directory = tempfile::tempdir().unwrap();
        let result = optimize_document(
            Path::new("/nonexistent/in.sch"),
            &directory.path().join("out.sch"),
            &[],
            None,
        );
        assert!(matches!(result, Err(SchoptError::Parse(_))));
        assert!(!directory.path().join("out.sch").exists());
    }
}
