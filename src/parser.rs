//! Three-pass Schematron document parser
//!
//! Parsing works on the root element's direct children, in three ordered
//! passes over the document tree:
//! 1. include resolution: `include` elements at the root and directly inside
//!    root-level patterns are replaced by the root element of the referenced
//!    file, exactly one level deep
//! 2. registration: namespaces, patterns, rules and the title are recorded
//!    in the definition; rules and patterns without an id get a generated one
//! 3. activation: patterns become [`Pattern`] values in document order, and
//!    top-level non-abstract rules are marked enabled
//!
//! All but the main phase of a Schematron file are ignored.

use crate::error::ParseError;
use crate::model::{Definition, Pattern, Rule, generate_id};
use crate::xml::{self, XmlElement, XmlNode};
use std::path::Path;

/// Parses a Schematron file into a [`Definition`]
///
/// Include targets are resolved relative to the source file's directory. No
/// transformation is applied during parsing.
///
/// # Errors
///
/// Returns a `ParseError` if the file or an include target cannot be read,
/// the XML is malformed, or an element is structurally invalid.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Definition, ParseError> {
    let path = path.as_ref();
    let root = xml::read_document(path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    parse_root(root, base_dir)
}

/// Parses a Schematron document from a string
///
/// `base_dir` is the directory against which include targets are resolved.
///
/// # Errors
///
/// Same conditions as [`parse_file`].
pub fn parse_str(source: &str, base_dir: impl AsRef<Path>) -> Result<Definition, ParseError> {
    parse_root(xml::parse_str(source)?, base_dir.as_ref())
}

fn parse_root(mut root: XmlElement, base_dir: &Path) -> Result<Definition, ParseError> {
    resolve_includes(&mut root, base_dir)?;

    let mut definition = Definition::new();
    register_definitions(&mut root, &mut definition)?;
    activate(&root, &mut definition)?;
    Ok(definition)
}

/// First pass: splice included documents in place of `include` elements
///
/// Resolution is deliberately non-transitive: includes found inside a spliced
/// document are left alone.
fn resolve_includes(root: &mut XmlElement, base_dir: &Path) -> Result<(), ParseError> {
    for index in 0..root.children.len() {
        let XmlNode::Element(child) = &mut root.children[index] else {
            continue;
        };
        match child.name.as_str() {
            "include" => {
                let included = load_include(child, base_dir)?;
                root.children[index] = XmlNode::Element(included);
            }
            "pattern" => {
                for pattern_index in 0..child.children.len() {
                    let XmlNode::Element(pattern_child) = &child.children[pattern_index] else {
                        continue;
                    };
                    if pattern_child.name == "include" {
                        let included = load_include(pattern_child, base_dir)?;
                        child.children[pattern_index] = XmlNode::Element(included);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn load_include(include: &XmlElement, base_dir: &Path) -> Result<XmlElement, ParseError> {
    let href = include
        .attribute("href")
        .filter(|href| !href.is_empty())
        .ok_or(ParseError::MissingAttribute {
            element: "include",
            attribute: "href",
        })?;
    xml::read_document(base_dir.join(href))
}

/// Second pass: record the query binding, namespaces, title, patterns and
/// rules
///
/// Generated ids are written back onto the elements so the activation pass
/// sees them.
fn register_definitions(
    root: &mut XmlElement,
    definition: &mut Definition,
) -> Result<(), ParseError> {
    definition.query_binding = root.attribute("queryBinding").unwrap_or_default().to_string();

    for child in root.children.iter_mut() {
        let XmlNode::Element(element) = child else {
            continue;
        };
        match element.name.as_str() {
            "ns" => {
                let prefix = element
                    .attribute("prefix")
                    .ok_or(ParseError::MissingAttribute {
                        element: "ns",
                        attribute: "prefix",
                    })?
                    .to_string();
                let uri = element
                    .attribute("uri")
                    .ok_or(ParseError::MissingAttribute {
                        element: "ns",
                        attribute: "uri",
                    })?
                    .to_string();
                definition.namespaces.insert(prefix, uri);
            }
            "pattern" => register_pattern(element, definition)?,
            "title" => {
                definition.title = element.text_content().trim().to_string();
            }
            "rule" => register_rule(element, None, definition)?,
            _ => {}
        }
    }
    Ok(())
}

fn register_pattern(
    pattern_element: &mut XmlElement,
    definition: &mut Definition,
) -> Result<(), ParseError> {
    if pattern_element.attribute("id").unwrap_or_default().is_empty() {
        pattern_element.set_attribute("id", generate_id());
    }
    let pattern_id = pattern_element
        .attribute("id")
        .unwrap_or_default()
        .to_string();

    definition
        .rules_per_pattern
        .entry(pattern_id.clone())
        .or_default();

    for child in pattern_element.children.iter_mut() {
        let XmlNode::Element(element) = child else {
            continue;
        };
        if element.name == "rule" {
            register_rule(element, Some(&pattern_id), definition)?;
        }
    }
    Ok(())
}

fn register_rule(
    rule_element: &mut XmlElement,
    pattern_id: Option<&str>,
    definition: &mut Definition,
) -> Result<(), ParseError> {
    if rule_element.attribute("id").unwrap_or_default().is_empty() {
        rule_element.set_attribute("id", generate_id());
    }

    let rule = match pattern_id {
        Some(pattern_id) => Rule::from_element_in_pattern(rule_element, pattern_id)?,
        None => Rule::from_element(rule_element)?,
    };

    if !rule.is_abstract
        && let Some(pattern_id) = pattern_id
        && let Some(rule_ids) = definition.rules_per_pattern.get_mut(pattern_id)
    {
        rule_ids.push(rule.id.clone());
    }
    definition.defined_rules.insert(rule.id.clone(), rule);
    Ok(())
}

/// Third pass: activate patterns and top-level rules in document order
fn activate(root: &XmlElement, definition: &mut Definition) -> Result<(), ParseError> {
    for element in root.child_elements() {
        match element.name.as_str() {
            "pattern" => {
                let pattern = Pattern::from_element(element)?;
                definition.push_pattern(pattern);
            }
            "rule" => {
                let rule_id = element.attribute("id").unwrap_or_default();
                if let Some(rule) = definition.defined_rules.get(rule_id)
                    && !rule.is_abstract
                {
                    definition.enable_rule(rule_id);
                }
            }
            _ => {}
        }
    }
    Ok(())
}
