//! Shared fixtures for schopt integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// Main document of the "simple" fixture: title, namespaces, an abstract
/// rule chain split over two includes, one pattern and one enabled
/// top-level rule
pub const SIMPLE_MAIN: &str = r#"<schema queryBinding="xslt2">
  <title>Simple Schematron definition</title>
  <ns prefix="ns1" uri="http://www.w3.org/2001/XMLSchema-instance"/>
  <ns prefix="ns2" uri="http://www.w3.org/2001/XMLSchema"/>
  <include href="rule1.sch"/>
  <rule abstract="true" id="rule2">
    <extends rule="rule1"/>
    <assert role="error" test="test2.1">Assert 2.1</assert>
    <let name="var2.2" value="'Variable 2.2'"/>
    <assert role="warn" test="test2.3">Assert 2.3</assert>
    <report role="warn" test="test2.4">Report 2.4</report>
  </rule>
  <pattern id="pattern1">
    <include href="rule3.sch"/>
  </pattern>
  <rule id="rule4" context="//x">
    <assert role="warn" test="test4.1">Assert 4.1</assert>
  </rule>
</schema>
"#;

/// Included at the root of the simple fixture
pub const SIMPLE_RULE1: &str = r#"<rule abstract="true" id="rule1">
  <assert role="warn" test="test1.1">Assert 1.1</assert>
</rule>
"#;

/// Included inside the simple fixture's pattern
pub const SIMPLE_RULE3: &str = r#"<rule id="rule3" context="/">
  <extends rule="rule2"/>
  <assert role="error" test="test3.1">Assert 3.1</assert>
</rule>
"#;

/// A self-contained document with a guard pattern, used wherever the
/// optimizer has to succeed
pub const GUARDED: &str = r#"<schema queryBinding="xslt2">
  <ns prefix="hl7" uri="urn:hl7-org:v3"/>
  <pattern id="guard">
    <rule id="guard-rule" context="*">
      <assert role="warn" test="hl7:templateId[@root = '2.16']">Missing template id</assert>
    </rule>
  </pattern>
  <pattern id="body">
    <rule id="base" abstract="true">
      <assert role="error" test="base.1">Base 1</assert>
      <assert role="warn" test="base.2">Base 2</assert>
    </rule>
    <rule id="main" context="*/hl7:observation">
      <let name="v" value="'x'"/>
      <extends rule="base"/>
      <assert role="error" test="main.1">Main 1</assert>
      <report role="error" test="*/a[b]/b">Main report</report>
    </rule>
  </pattern>
</schema>
"#;

/// Writes the simple fixture (main document plus both includes) into a
/// directory and returns the path of the main document
pub fn write_simple_fixture(directory: &Path) -> std::path::PathBuf {
    fs::write(directory.join("rule1.sch"), SIMPLE_RULE1).unwrap();
    fs::write(directory.join("rule3.sch"), SIMPLE_RULE3).unwrap();
    let main = directory.join("main.sch");
    fs::write(&main, SIMPLE_MAIN).unwrap();
    main
}
