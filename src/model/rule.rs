//! Rules and their children (assertions, reports, variables, extends)

use crate::error::ParseError;
use crate::model::generate_id;
use crate::xml::{XmlElement, XmlNode};

/// A list of assertions tested within the context specified by the rule's
/// context expression
///
/// A non-abstract rule has a context and no further obligations; an abstract
/// rule has an id, no context, and is only ever reachable through 'extends'
/// references.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// The parent pattern id, or `None` for a top-level rule
    pub pattern: Option<String>,

    /// The rule id; generated by the parser when the source has none
    pub id: String,

    /// The rule context expression, or `None` for an abstract rule
    pub context: Option<String>,

    /// The rule children, in document order; the order is semantically
    /// significant and preserved through every transform
    pub children: Vec<RuleChild>,

    /// Whether the rule is abstract
    pub is_abstract: bool,
}

impl Rule {
    /// Constructs a rule from a parsed `rule` element
    ///
    /// Unknown element kinds among the children are silently skipped, so rich
    /// message markup that the model does not represent cannot break parsing.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the element is not a `rule`, the `abstract`
    /// attribute is invalid, an abstract rule has a context or lacks an id, a
    /// non-abstract rule lacks a context, or a child element is structurally
    /// invalid.
    pub fn from_element(element: &XmlElement) -> Result<Self, ParseError> {
        if element.name != "rule" {
            return Err(ParseError::UnexpectedElement {
                expected: "rule",
                found: element.name.clone(),
            });
        }

        let is_abstract = parse_abstract_attribute(element, "rule")?;
        if is_abstract && element.has_attribute("context") {
            return Err(ParseError::AbstractRuleWithContext(
                element.attribute("id").unwrap_or_default().to_string(),
            ));
        }
        if !is_abstract && !element.has_attribute("context") {
            return Err(ParseError::MissingContext);
        }
        if is_abstract && !element.has_attribute("id") {
            return Err(ParseError::AbstractRuleWithoutId);
        }

        let mut children = Vec::new();
        for child in element.child_elements() {
            match child.name.as_str() {
                "extends" => children.push(RuleChild::Extends(Extends::from_element(child)?)),
                "let" => children.push(RuleChild::Let(Let::from_element(child)?)),
                "assert" => children.push(RuleChild::Assert(Assert::from_element(child)?)),
                "report" => children.push(RuleChild::Report(Report::from_element(child)?)),
                _ => {}
            }
        }

        let id = match element.attribute("id") {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_id(),
        };

        Ok(Rule {
            pattern: None,
            id,
            context: element.attribute("context").map(String::from),
            children,
            is_abstract,
        })
    }

    /// Constructs a rule from a parsed `rule` element, recording the id of
    /// the pattern it was found in
    ///
    /// # Errors
    ///
    /// Same conditions as [`Rule::from_element`].
    pub fn from_element_in_pattern(
        element: &XmlElement,
        pattern_id: &str,
    ) -> Result<Self, ParseError> {
        let mut rule = Rule::from_element(element)?;
        rule.pattern = Some(pattern_id.to_string());
        Ok(rule)
    }

    /// Returns whether this rule still carries an 'extends' reference
    pub fn has_extends(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, RuleChild::Extends(_)))
    }
}

/// A child of a rule
///
/// Exactly these four kinds are valid in the dialect; everything else is
/// skipped at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleChild {
    Assert(Assert),
    Report(Report),
    Let(Let),
    Extends(Extends),
}

/// An assertion: a test expression that must evaluate to true at every node
/// matched by the rule context
#[derive(Debug, Clone, PartialEq)]
pub struct Assert {
    /// The severity role, an open vocabulary (e.g. "warn", "error", "fatal")
    pub role: Option<String>,

    /// The test expression
    pub test: String,

    /// An optional documentation URI
    pub see: Option<String>,

    /// The message shown on failure: mixed text/markup content, carried
    /// through opaquely
    pub message: Vec<XmlNode>,
}

impl Assert {
    /// Constructs an assertion from a parsed `assert` element
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingAttribute` if `test` is absent.
    pub fn from_element(element: &XmlElement) -> Result<Self, ParseError> {
        let test = require_attribute(element, "assert", "test")?;
        Ok(Assert {
            role: element.attribute("role").map(String::from),
            test,
            see: element.attribute("see").map(String::from),
            message: element.children.clone(),
        })
    }
}

/// A report: the inverse of an assertion, firing when its test evaluates to
/// true
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The severity role, an open vocabulary
    pub role: Option<String>,

    /// The test expression
    pub test: String,

    /// An optional documentation URI
    pub see: Option<String>,

    /// The message shown when the report fires
    pub message: Vec<XmlNode>,
}

impl Report {
    /// Constructs a report from a parsed `report` element
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingAttribute` if `test` is absent.
    pub fn from_element(element: &XmlElement) -> Result<Self, ParseError> {
        let test = require_attribute(element, "report", "test")?;
        Ok(Report {
            role: element.attribute("role").map(String::from),
            test,
            see: element.attribute("see").map(String::from),
            message: element.children.clone(),
        })
    }
}

/// A variable binding available to the following children of the rule
#[derive(Debug, Clone, PartialEq)]
pub struct Let {
    /// The variable name
    pub name: String,

    /// The value expression, never evaluated here
    pub value: String,
}

impl Let {
    /// Constructs a variable binding from a parsed `let` element
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingAttribute` if `name` or `value` is absent.
    pub fn from_element(element: &XmlElement) -> Result<Self, ParseError> {
        Ok(Let {
            name: require_attribute(element, "let", "name")?,
            value: require_attribute(element, "let", "value")?,
        })
    }
}

/// A rule-inheritance reference, inlined at resolution time
#[derive(Debug, Clone, PartialEq)]
pub struct Extends {
    /// The id of the extended rule; a lookup key, not an ownership relation
    pub rule: String,
}

impl Extends {
    /// Constructs an inheritance reference from a parsed `extends` element
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingAttribute` if `rule` is absent.
    pub fn from_element(element: &XmlElement) -> Result<Self, ParseError> {
        Ok(Extends {
            rule: require_attribute(element, "extends", "rule")?,
        })
    }
}

/// Validates the case-insensitive `abstract` attribute, defaulting to false
/// when absent
pub(crate) fn parse_abstract_attribute(
    element: &XmlElement,
    element_name: &'static str,
) -> Result<bool, ParseError> {
    match element.attribute("abstract") {
        None => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(value) => Err(ParseError::InvalidAbstract {
            element: element_name,
            value: value.to_string(),
        }),
    }
}

fn require_attribute(
    element: &XmlElement,
    element_name: &'static str,
    attribute: &'static str,
) -> Result<String, ParseError> {
    element
        .attribute(attribute)
        .map(String::from)
        .ok_or(ParseError::MissingAttribute {
            element: element_name,
            attribute,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_assert_from_element() {
        let element = parse_str(
            r#"<assert role="warning" test="II" see="http://example.org">Found: <value-of select="@root"/></assert>"#,
        )
        .unwrap();
        let assertion = Assert::from_element(&element).unwrap();
        assert_eq!(assertion.role.as_deref(), Some("warning"));
        assert_eq!(assertion.test, "II");
        assert_eq!(assertion.see.as_deref(), Some("http://example.org"));
        assert_eq!(assertion.message.len(), 2);
    }

    #[test]
    fn test_assert_optional_attributes() {
        let element = parse_str(r#"<assert test="II"/>"#).unwrap();
        let assertion = Assert::from_element(&element).unwrap();
        assert_eq!(assertion.role, None);
        assert_eq!(assertion.see, None);
        assert!(assertion.message.is_empty());
    }

    #[test]
    fn test_assert_requires_test() {
        let element = parse_str(r#"<assert role="warn"/>"#).unwrap();
        assert!(matches!(
            Assert::from_element(&element),
            Err(ParseError::MissingAttribute {
                element: "assert",
                attribute: "test"
            })
        ));
    }

    #[test]
    fn test_report_from_element() {
        let element = parse_str(r#"<report role="error" test="not(x)">No x</report>"#).unwrap();
        let report = Report::from_element(&element).unwrap();
        assert_eq!(report.role.as_deref(), Some("error"));
        assert_eq!(report.test, "not(x)");
        assert_eq!(report.message.len(), 1);
    }

    #[test]
    fn test_let_from_element() {
        let element = parse_str(r#"<let name="v" value="'Variable'"/>"#).unwrap();
        let binding = Let::from_element(&element).unwrap();
        assert_eq!(binding.name, "v");
        assert_eq!(binding.value, "'Variable'");

        let element = parse_str(r#"<let name="v"/>"#).unwrap();
        assert!(matches!(
            Let::from_element(&element),
            Err(ParseError::MissingAttribute {
                element: "let",
                attribute: "value"
            })
        ));
    }

    #[test]
    fn test_extends_from_element() {
        let element = parse_str(r#"<extends rule="base"/>"#).unwrap();
        assert_eq!(Extends::from_element(&element).unwrap().rule, "base");

        let element = parse_str(r#"<extends/>"#).unwrap();
        assert!(Extends::from_element(&element).is_err());
    }

    #[test]
    fn test_rule_from_element() {
        let element = parse_str(
            r#"<rule id="r1" context="/">
                <extends rule="base"/>
                <let name="v" value="'x'"/>
                <assert test="a">A</assert>
                <report test="b">B</report>
                <unknown-thing/>
            </rule>"#,
        )
        .unwrap();
        let rule = Rule::from_element(&element).unwrap();
        assert_eq!(rule.id, "r1");
        assert_eq!(rule.context.as_deref(), Some("/"));
        assert!(!rule.is_abstract);
        assert_eq!(rule.pattern, None);
        assert!(rule.has_extends());

        // The unknown element is skipped, the four known kinds are kept in order
        assert_eq!(rule.children.len(), 4);
        assert!(matches!(&rule.children[0], RuleChild::Extends(e) if e.rule == "base"));
        assert!(matches!(&rule.children[1], RuleChild::Let(l) if l.name == "v"));
        assert!(matches!(&rule.children[2], RuleChild::Assert(a) if a.test == "a"));
        assert!(matches!(&rule.children[3], RuleChild::Report(r) if r.test == "b"));
    }

    #[test]
    fn test_rule_generates_missing_id() {
        let element = parse_str(r#"<rule context="/"/>"#).unwrap();
        let rule = Rule::from_element(&element).unwrap();
        assert_eq!(rule.id.len(), 39);
        assert!(rule.id.starts_with("id_"));
    }

    #[test]
    fn test_rule_abstract_validation() {
        let element = parse_str(r#"<rule abstract="TRUE" id="r1"/>"#).unwrap();
        assert!(Rule::from_element(&element).unwrap().is_abstract);

        let element = parse_str(r#"<rule abstract="yes" id="r1"/>"#).unwrap();
        assert!(matches!(
            Rule::from_element(&element),
            Err(ParseError::InvalidAbstract { element: "rule", .. })
        ));

        let element = parse_str(r#"<rule abstract="true" id="r1" context="/"/>"#).unwrap();
        assert!(matches!(
            Rule::from_element(&element),
            Err(ParseError::AbstractRuleWithContext(id)) if id == "r1"
        ));

        let element = parse_str(r#"<rule abstract="true"/>"#).unwrap();
        assert!(matches!(
            Rule::from_element(&element),
            Err(ParseError::AbstractRuleWithoutId)
        ));

        let element = parse_str(r#"<rule id="r1"/>"#).unwrap();
        assert!(matches!(
            Rule::from_element(&element),
            Err(ParseError::MissingContext)
        ));
    }

    #[test]
    fn test_rule_from_element_in_pattern() {
        let element = parse_str(r#"<rule id="r1" context="/"/>"#).unwrap();
        let rule = Rule::from_element_in_pattern(&element, "p1").unwrap();
        assert_eq!(rule.pattern.as_deref(), Some("p1"));
    }

    #[test]
    fn test_rule_rejects_wrong_element() {
        let element = parse_str(r#"<pattern id="p1"/>"#).unwrap();
        assert!(matches!(
            Rule::from_element(&element),
            Err(ParseError::UnexpectedElement { expected: "rule", .. })
        ));
    }
}
