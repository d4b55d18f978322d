//! In-memory model of a parsed Schematron rule document

pub mod definition;
pub mod pattern;
pub mod rule;

// Re-export core types
pub use definition::Definition;
pub use pattern::Pattern;
pub use rule::{Assert, Extends, Let, Report, Rule, RuleChild};

/// The namespace URI of the Schematron dialect
pub const SCHEMATRON_NAMESPACE: &str = "http://purl.oclc.org/dsdl/schematron";

/// Generates a document-unique id for a rule or pattern that has none in the
/// source
///
/// Ids are of the form `id_<uuid>` with hyphens replaced by underscores, and
/// are stable for the remainder of one conversion run.
pub fn generate_id() -> String {
    format!("id_{}", uuid::Uuid::new_v4().to_string().replace('-', "_"))
}
