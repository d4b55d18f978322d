//! Patterns: named groupings of rules

use crate::error::ParseError;
use crate::model::rule::parse_abstract_attribute;
use crate::xml::XmlElement;

/// A pattern is a set of rules giving constraints that are in some way
/// related
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// The pattern id; generated by the parser when the source has none
    pub id: String,

    /// Whether the pattern is abstract
    pub is_abstract: bool,

    /// The pattern title, or `None` if it isn't set
    pub title: Option<String>,
}

impl Pattern {
    /// Constructs a pattern from a parsed `pattern` element
    ///
    /// The parser assigns a generated id to the element before calling this,
    /// so the `id` attribute is expected to be present.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the element is not a `pattern`, its id is
    /// absent, or the `abstract` attribute is invalid.
    pub fn from_element(element: &XmlElement) -> Result<Self, ParseError> {
        if element.name != "pattern" {
            return Err(ParseError::UnexpectedElement {
                expected: "pattern",
                found: element.name.clone(),
            });
        }

        let is_abstract = parse_abstract_attribute(element, "pattern")?;
        let id = element
            .attribute("id")
            .filter(|id| !id.is_empty())
            .ok_or(ParseError::MissingAttribute {
                element: "pattern",
                attribute: "id",
            })?;

        Ok(Pattern {
            id: id.to_string(),
            is_abstract,
            title: element.attribute("title").map(String::from),
        })
    }
}
