#![forbid(unsafe_code)]

//! Schopt: Schematron rule-document normalizer and optimizer
//!
//! Schopt loads a Schematron rule document and its includes, resolves rule
//! inheritance ('extends'), rewrites XPath expressions into a more portable
//! form, optionally filters assertions by severity role, and writes back a
//! self-contained, optimized rule document ready for downstream compilation.

pub mod cli;
pub mod error;
pub mod model;
pub mod optimizer;
pub mod parser;
pub mod transform;
pub mod writer;
pub mod xml;
pub mod xpath;

// Re-export error types for convenient access
pub use error::{
    ParseError, PreconditionError, ReferenceError, SchoptError, TransformError, WriteError,
};

// Re-export core domain types for convenient access
pub use model::{Assert, Definition, Extends, Let, Pattern, Report, Rule, RuleChild};
pub use transform::DefinitionTransformer;
