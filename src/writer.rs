//! Document writer
//!
//! Serializes a [`Definition`] back to the Schematron dialect. Every rule's
//! 'extends' chain is resolved at emission time, independently of whether the
//! optimizer already filtered 'extends' markers away: redundant-but-safe
//! after role filtering, load-bearing otherwise. Rules that end up with no
//! children and patterns that end up with no rules are omitted entirely.
//!
//! The output is staged through a temporary file in the destination's
//! directory and moved into place atomically, so a failed write never leaves
//! a truncated document behind.

use crate::error::WriteError;
use crate::model::{Definition, RuleChild, SCHEMATRON_NAMESPACE};
use crate::xml::{self, XmlElement};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes a definition to the destination path
///
/// # Errors
///
/// Returns `WriteError::Io` if the destination is not writable,
/// `WriteError::Reference` if an 'extends' chain cannot be resolved, and
/// `WriteError::UnknownPattern` if a pattern has no rule listing.
pub fn write(definition: &Definition, destination: impl AsRef<Path>) -> Result<(), WriteError> {
    let destination = destination.as_ref();
    let document = to_document(definition)?;
    let content = xml::to_xml_string(&document).map_err(|source| WriteError::Io {
        path: destination.to_path_buf(),
        source,
    })?;

    let directory = match destination.parent() {
        Some(parent) if parent != Path::new("") => parent,
        _ => Path::new("."),
    };
    let io_error = |source: std::io::Error| WriteError::Io {
        path: destination.to_path_buf(),
        source,
    };

    let temp_file = NamedTempFile::new_in(directory).map_err(io_error)?;
    std::fs::write(temp_file.path(), content).map_err(io_error)?;
    temp_file
        .persist(destination)
        .map_err(|error| io_error(error.error))?;
    Ok(())
}

/// Builds the output document tree for a definition
///
/// # Errors
///
/// Same reference and pattern-listing conditions as [`write`].
pub fn to_document(definition: &Definition) -> Result<XmlElement, WriteError> {
    let mut root = XmlElement::new("schema");
    root.set_attribute("xmlns", SCHEMATRON_NAMESPACE);
    root.set_attribute("queryBinding", definition.query_binding.clone());

    if !definition.title.is_empty() {
        let mut title = XmlElement::new("title");
        title.push_text(definition.title.clone());
        root.push_element(title);
    }

    for (prefix, uri) in &definition.namespaces {
        let mut namespace = XmlElement::new("ns");
        namespace.set_attribute("prefix", prefix.clone());
        namespace.set_attribute("uri", uri.clone());
        root.push_element(namespace);
    }

    for pattern in &definition.patterns {
        let rule_ids = definition
            .rules_per_pattern
            .get(&pattern.id)
            .ok_or_else(|| WriteError::UnknownPattern(pattern.id.clone()))?;

        let mut pattern_element = XmlElement::new("pattern");
        pattern_element.set_attribute("id", pattern.id.clone());

        for rule_id in rule_ids {
            // Ids removed from the defined rules (e.g. by a rewrite hook) are
            // skipped, as are abstract rules
            let Some(rule) = definition.defined_rules.get(rule_id) else {
                continue;
            };
            if rule.is_abstract {
                continue;
            }

            let resolved = definition.resolved_rule(rule_id)?;
            let mut rule_element = XmlElement::new("rule");
            rule_element.set_attribute("id", resolved.id.clone());
            if let Some(context) = &resolved.context {
                rule_element.set_attribute("context", context.clone());
            }

            for child in &resolved.children {
                match child {
                    RuleChild::Assert(assertion) => {
                        let mut element = XmlElement::new("assert");
                        element.set_attribute("test", assertion.test.clone());
                        if let Some(role) = &assertion.role {
                            element.set_attribute("role", role.clone());
                        }
                        element.children.extend(assertion.message.iter().cloned());
                        rule_element.push_element(element);
                    }
                    RuleChild::Report(report) => {
                        let mut element = XmlElement::new("report");
                        element.set_attribute("test", report.test.clone());
                        if let Some(role) = &report.role {
                            element.set_attribute("role", role.clone());
                        }
                        element.children.extend(report.message.iter().cloned());
                        rule_element.push_element(element);
                    }
                    RuleChild::Let(binding) => {
                        let mut element = XmlElement::new("let");
                        element.set_attribute("name", binding.name.clone());
                        element.set_attribute("value", binding.value.clone());
                        rule_element.push_element(element);
                    }
                    // Fully resolved rules carry no 'extends'; anything that
                    // still does (e.g. hand-built definitions) emits nothing
                    RuleChild::Extends(_) => {}
                }
            }

            if !rule_element.children.is_empty() {
                pattern_element.push_element(rule_element);
            }
        }

        if !pattern_element.children.is_empty() {
            root.push_element(pattern_element);
        }
    }

    Ok(root)
}
