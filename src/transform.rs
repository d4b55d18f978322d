//! Rewrite hooks: pluggable document-level transformers
//!
//! Hooks run after parsing and before optimization, in the order the caller
//! supplies them. The one concrete hook shipped here is data-driven: a TOML
//! file names rules to remove wholesale and literal substring replacements to
//! apply inside assert/report test expressions, covering the profile-specific
//! substitution tables (e.g. value-set OID swaps) that used to be hardcoded.

use crate::error::TransformError;
use crate::model::{Definition, RuleChild};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A document-level transformer applied between parsing and optimization
///
/// Implementations must be pure with respect to everything but the given
/// definition, so independent documents can be converted in parallel.
pub trait DefinitionTransformer: Send + Sync {
    /// Applies the transformation to the definition, mutating it in place
    fn transform(&self, definition: &mut Definition);
}

/// Configuration for a [`SubstitutionTransformer`], loaded from TOML
///
/// ```toml
/// [transform]
/// remove-rules = ["d141e6943-true-d269204e0"]
///
/// [transform.replace]
/// "2.16.756.5.30.1.1.11.2" = "2.16.756.5.30.1.127.77.12.11.1"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TransformConfig {
    /// The transform section
    #[serde(default)]
    pub transform: TransformSection,
}

/// The `[transform]` section of a transform configuration file
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransformSection {
    /// Rule ids to remove from the definition entirely
    #[serde(default)]
    pub remove_rules: Vec<String>,

    /// Literal find/replace pairs applied to assert and report tests;
    /// ordered by search string so application is deterministic
    #[serde(default)]
    pub replace: BTreeMap<String, String>,
}

impl TransformConfig {
    /// Loads a transform configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `TransformError::Io` if the file cannot be read,
    /// `TransformError::Parse` if it is not valid TOML, and
    /// `TransformError::Validation` if a value is unusable.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses a transform configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Same parse and validation conditions as [`TransformConfig::load`].
    pub fn parse(s: &str) -> Result<Self, TransformError> {
        let config: TransformConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    fn validate(&self) -> Result<(), TransformError> {
        for rule_id in &self.transform.remove_rules {
            if rule_id.is_empty() {
                return Err(TransformError::Validation(
                    "remove-rules entries must not be empty".to_string(),
                ));
            }
        }
        for search in self.transform.replace.keys() {
            if search.is_empty() {
                return Err(TransformError::Validation(
                    "replace search strings must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A data-driven rewrite hook: removes rules by id, then applies literal
/// find/replace pairs to every assert and report test expression
#[derive(Debug, Clone)]
pub struct SubstitutionTransformer {
    remove_rules: Vec<String>,
    replace: BTreeMap<String, String>,
}

impl SubstitutionTransformer {
    /// Creates a transformer from a parsed configuration
    pub fn new(config: TransformConfig) -> Self {
        SubstitutionTransformer {
            remove_rules: config.transform.remove_rules,
            replace: config.transform.replace,
        }
    }

    /// Creates a transformer directly from a TOML file
    ///
    /// # Errors
    ///
    /// Same conditions as [`TransformConfig::load`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        Ok(Self::new(TransformConfig::load(path)?))
    }

    fn apply_replacements(&self, test: &mut String) {
        for (search, replacement) in &self.replace {
            if test.contains(search.as_str()) {
                *test = test.replace(search.as_str(), replacement);
            }
        }
    }
}

impl DefinitionTransformer for SubstitutionTransformer {
    fn transform(&self, definition: &mut Definition) {
        for rule_id in &self.remove_rules {
            definition.remove_rule(rule_id);
        }

        for rule in definition.defined_rules.values_mut() {
            for child in rule.children.iter_mut() {
                match child {
                    RuleChild::Assert(assertion) => self.apply_replacements(&mut assertion.test),
                    RuleChild::Report(report) => self.apply_replacements(&mut report.test),
                    RuleChild::Let(_) | RuleChild::Extends(_) => {}
                }
            }
        }
    }
}

/// Applies an ordered slice of transformers to a definition
pub fn apply_all(definition: &mut Definition, transformers: &[Box<dyn DefinitionTransformer>]) {
    for transformer in transformers {
        transformer.transform(definition);
    }
}
