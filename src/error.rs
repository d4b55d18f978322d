//! Error types for Schopt
//!
//! This module defines the error types used throughout Schopt, following
//! a hierarchical structure with one enum per error category: structural
//! parse errors, reference errors, optimizer precondition errors, writer
//! errors and rewrite-hook configuration errors.

use std::path::PathBuf;

/// Structural errors raised while parsing a Schematron document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The source document or an included file cannot be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML
    #[error("malformed XML: {0}")]
    Malformed(String),

    /// A constructor was handed the wrong element kind
    #[error("expected a '{expected}' element, found '{found}'")]
    UnexpectedElement { expected: &'static str, found: String },

    /// A required attribute is absent
    #[error("a '{element}' element is missing its '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// The 'abstract' attribute carries a value other than true/false
    #[error("the 'abstract' attribute of the '{element}' element must be 'true' or 'false', got '{value}'")]
    InvalidAbstract {
        element: &'static str,
        value: String,
    },

    /// An abstract rule declared a context expression
    #[error("an abstract 'rule' element must not have a 'context' attribute (rule '{0}')")]
    AbstractRuleWithContext(String),

    /// A concrete rule is missing its context expression
    #[error("a non-abstract 'rule' element must have a 'context' attribute")]
    MissingContext,

    /// An abstract rule is missing its identifier
    #[error("an abstract 'rule' element must have an 'id' attribute")]
    AbstractRuleWithoutId,
}

/// Errors raised while resolving 'extends' references between rules
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// A rule is not present in the definition
    #[error("rule '{0}' is not defined")]
    UndefinedRule(String),

    /// An 'extends' element points at a rule id that does not exist
    #[error("rule '{from}' extends unknown rule '{target}'")]
    UnknownRule { from: String, target: String },

    /// The 'extends' chain loops back onto a rule already being resolved
    #[error("circular 'extends' chain detected at rule '{0}'")]
    CircularExtends(String),
}

/// Errors raised when the optimizer's guard-rule convention is violated
#[derive(Debug, thiserror::Error)]
pub enum PreconditionError {
    /// No pattern holds exactly one rule, so no guard rule can be located
    #[error("no pattern with exactly one rule; cannot locate the guard rule")]
    NoGuardPattern,

    /// The guard pattern lists a rule id that is not defined
    #[error("guard rule '{rule}' of pattern '{pattern}' is not defined")]
    MissingGuardRule { pattern: String, rule: String },

    /// The guard rule's first child is not an assert
    #[error("the first child of guard rule '{rule}' (pattern '{pattern}') must be an 'assert' element")]
    GuardChildNotAssert { pattern: String, rule: String },
}

/// Errors raised while writing an optimized document
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The destination cannot be written
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Emission-time extends resolution failed
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// A pattern has no entry in the per-pattern rule listing
    #[error("pattern '{0}' has no rule listing in the definition")]
    UnknownPattern(String),
}

/// Errors raised while loading a rewrite-hook configuration file
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The configuration file cannot be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML
    #[error("invalid transform configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration carries an unusable value
    #[error("invalid transform configuration: {0}")]
    Validation(String),
}

/// Top-level error type for Schopt
#[derive(Debug, thiserror::Error)]
pub enum SchoptError {
    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Reference error
    #[error("reference error: {0}")]
    Reference(#[from] ReferenceError),

    /// Optimizer precondition error
    #[error("precondition error: {0}")]
    Precondition(#[from] PreconditionError),

    /// Writer error
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// Rewrite-hook configuration error
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
