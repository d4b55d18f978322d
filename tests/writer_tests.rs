//! Integration tests for the document writer

mod common;

use schopt::error::WriteError;
use schopt::parser;
use schopt::writer;
use schopt::xml::{self, XmlElement};
use tempfile::TempDir;

fn patterns_of(document: &XmlElement) -> Vec<&XmlElement> {
    document
        .child_elements()
        .filter(|element| element.name == "pattern")
        .collect()
}

#[test]
fn test_pattern_order_is_preserved() {
    let source = r#"<schema queryBinding="xslt2">
        <pattern id="p1"><rule id="r1" context="/"><assert test="a"/></rule></pattern>
        <pattern id="p2"><rule id="r2" context="/"><assert test="b"/></rule></pattern>
        <pattern id="p3"><rule id="r3" context="/"><assert test="c"/></rule></pattern>
        <pattern id="p4"><rule id="r4" context="/"><assert test="d"/></rule></pattern>
        <pattern id="p5"/>
        <pattern id="p6"><rule id="r6" context="/"><assert test="e"/></rule></pattern>
    </schema>"#;
    let definition = parser::parse_str(source, ".").unwrap();
    let document = writer::to_document(&definition).unwrap();

    // p5 is empty and omitted; the rest keep document order
    let ids: Vec<_> = patterns_of(&document)
        .iter()
        .map(|pattern| pattern.attribute("id").unwrap())
        .collect();
    assert_eq!(ids, vec!["p1", "p2", "p3", "p4", "p6"]);
}

#[test]
fn test_extends_are_resolved_at_emission_time() {
    let directory = TempDir::new().unwrap();
    let main = common::write_simple_fixture(directory.path());
    let definition = parser::parse_file(&main).unwrap();
    let document = writer::to_document(&definition).unwrap();

    let patterns = patterns_of(&document);
    assert_eq!(patterns.len(), 1);
    let rules: Vec<_> = patterns[0].child_elements().collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].attribute("id"), Some("rule3"));
    assert_eq!(rules[0].attribute("context"), Some("/"));

    let children: Vec<_> = rules[0].child_elements().collect();
    assert_eq!(children.len(), 6);
    assert_eq!(children[0].name, "assert");
    assert_eq!(children[0].attribute("test"), Some("test1.1"));
    assert_eq!(children[1].name, "assert");
    assert_eq!(children[1].attribute("test"), Some("test2.1"));
    assert_eq!(children[2].name, "let");
    assert_eq!(children[2].attribute("name"), Some("var2.2"));
    assert_eq!(children[2].attribute("value"), Some("'Variable 2.2'"));
    assert_eq!(children[3].name, "assert");
    assert_eq!(children[3].attribute("test"), Some("test2.3"));
    assert_eq!(children[4].name, "report");
    assert_eq!(children[4].attribute("test"), Some("test2.4"));
    assert_eq!(children[5].name, "assert");
    assert_eq!(children[5].attribute("test"), Some("test3.1"));
}

#[test]
fn test_root_carries_title_binding_and_namespaces() {
    let directory = TempDir::new().unwrap();
    let main = common::write_simple_fixture(directory.path());
    let definition = parser::parse_file(&main).unwrap();
    let document = writer::to_document(&definition).unwrap();

    assert_eq!(document.name, "schema");
    assert_eq!(document.attribute("queryBinding"), Some("xslt2"));

    let children: Vec<_> = document.child_elements().collect();
    assert_eq!(children[0].name, "title");
    assert_eq!(children[0].text_content(), "Simple Schematron definition");
    // Namespaces come sorted by prefix
    assert_eq!(children[1].name, "ns");
    assert_eq!(children[1].attribute("prefix"), Some("ns1"));
    assert_eq!(children[2].name, "ns");
    assert_eq!(children[2].attribute("prefix"), Some("ns2"));
}

#[test]
fn test_round_trip_preserves_structure() {
    // Parse -> write -> re-parse on a document with no extends/include and
    // no optimization reproduces the same structure
    let source = r#"<schema queryBinding="xslt2">
        <title>Round trip</title>
        <ns prefix="hl7" uri="urn:hl7-org:v3"/>
        <pattern id="p1">
            <rule id="r1" context="//hl7:observation">
                <let name="v" value="'x'"/>
                <assert role="warn" test="a">Message <name/> here</assert>
                <report role="error" test="b">Report</report>
            </rule>
            <rule id="r2" context="/"><assert test="c"/></rule>
        </pattern>
        <pattern id="p2">
            <rule id="r3" context="*"><assert test="d"/></rule>
        </pattern>
    </schema>"#;
    let definition = parser::parse_str(source, ".").unwrap();

    let serialized = xml::to_xml_string(&writer::to_document(&definition).unwrap()).unwrap();
    let reparsed = parser::parse_str(&serialized, ".").unwrap();

    assert_eq!(reparsed.title, definition.title);
    assert_eq!(reparsed.query_binding, definition.query_binding);
    assert_eq!(reparsed.namespaces, definition.namespaces);
    assert_eq!(reparsed.patterns, definition.patterns);
    assert_eq!(reparsed.rules_per_pattern, definition.rules_per_pattern);
    assert_eq!(reparsed.defined_rules, definition.defined_rules);
}

#[test]
fn test_unknown_rule_ids_are_skipped() {
    let source = r#"<schema>
        <pattern id="p1">
            <rule id="r1" context="/"><assert test="a"/></rule>
        </pattern>
    </schema>"#;
    let mut definition = parser::parse_str(source, ".").unwrap();
    // Simulate a rewrite hook removing the rule definition but not the
    // listing: the writer must skip the dangling id
    definition.defined_rules.remove("r1");

    let document = writer::to_document(&definition).unwrap();
    assert!(patterns_of(&document).is_empty());
}

#[test]
fn test_write_is_atomic_on_resolution_failure() {
    let source = r#"<schema>
        <pattern id="p1">
            <rule id="r1" context="/"><extends rule="ghost"/></rule>
        </pattern>
    </schema>"#;
    let definition = parser::parse_str(source, ".").unwrap();

    let directory = TempDir::new().unwrap();
    let destination = directory.path().join("out.sch");
    let result = writer::write(&definition, &destination);
    assert!(matches!(result, Err(WriteError::Reference(_))));
    assert!(!destination.exists());
    // No temporary file lingers either
    assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
}

#[test]
fn test_written_document_reparses() {
    let directory = TempDir::new().unwrap();
    let main = common::write_simple_fixture(directory.path());
    let definition = parser::parse_file(&main).unwrap();

    let destination = directory.path().join("out.sch");
    writer::write(&definition, &destination).unwrap();

    let written = parser::parse_file(&destination).unwrap();
    // The output is self-contained: the only surviving rule is the resolved
    // pattern rule, with no extends left
    assert_eq!(written.defined_rules.len(), 1);
    assert!(!written.defined_rules["rule3"].has_extends());
    assert_eq!(written.defined_rules["rule3"].children.len(), 6);
}
