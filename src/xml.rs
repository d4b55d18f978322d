//! Minimal owned XML tree over quick-xml
//!
//! The parser, the writer and the tests all work on small documents that are
//! mutated in place (include splicing, generated ids), so this module keeps a
//! fully owned element tree instead of streaming events end to end:
//! - `parse_str`/`read_document` tokenize a well-formed document into the tree
//! - `to_xml_string` serializes a tree back to XML text
//!
//! Only elements and text are modeled. Comments, processing instructions and
//! the XML declaration are dropped on input; CDATA sections are folded into
//! plain text.

use crate::error::ParseError;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::path::Path;

/// A node of the owned XML tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// An element with attributes and children
    Element(XmlElement),
    /// A text node, stored unescaped
    Text(String),
}

/// An element of the owned XML tree
///
/// Attributes keep their document order; `set_attribute` replaces in place so
/// a generated id does not reorder the remaining attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// The element name, exactly as written in the source
    pub name: String,

    /// Attributes in document order
    attributes: Vec<(String, String)>,

    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an empty element with the given name
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the value of an attribute, if present
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns whether an attribute is present
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Sets an attribute, replacing any existing value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Iterates over the attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Iterates over the element children, skipping text nodes
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Appends an element child
    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Appends a text child
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Returns the concatenated text content of the element and its
    /// descendants, like DOM `textContent`
    pub fn text_content(&self) -> String {
        let mut content = String::new();
        collect_text(self, &mut content);
        content
    }
}

fn collect_text(element: &XmlElement, content: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => content.push_str(text),
            XmlNode::Element(child_element) => collect_text(child_element, content),
        }
    }
}

/// Reads and parses an XML document from a file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read and
/// `ParseError::Malformed` if it is not well-formed XML.
pub fn read_document(path: impl AsRef<Path>) -> Result<XmlElement, ParseError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content)
}

/// Parses an XML document from a string into its root element
///
/// # Errors
///
/// Returns `ParseError::Malformed` if the input is not well-formed XML or
/// does not contain exactly one root element.
pub fn parse_str(xml: &str) -> Result<XmlElement, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::Malformed("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(malformed)?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(value.into_owned());
                }
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(value);
                }
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions and doctype are
            // not part of the model
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::Malformed(
            "document ended with unclosed elements".to_string(),
        ));
    }
    root.ok_or_else(|| ParseError::Malformed("document has no root element".to_string()))
}

/// Serializes an element tree to XML text, with an XML declaration and a
/// trailing newline
///
/// # Errors
///
/// Returns an I/O error if the underlying writer fails.
pub fn to_xml_string(root: &XmlElement) -> std::io::Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    write_element(&mut writer, root)?;
    let mut buffer = writer.into_inner();
    buffer.push(b'\n');
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> std::io::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in element.attributes() {
        start.push_attribute((key, value));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            match child {
                XmlNode::Element(child_element) => write_element(writer, child_element)?,
                XmlNode::Text(text) => {
                    writer.write_event(Event::Text(BytesText::new(text)))?;
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, ParseError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(malformed)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(malformed)?.into_owned();
        element.set_attribute(key, value);
    }
    Ok(element)
}

fn attach(
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_element(element);
            Ok(())
        }
        None => {
            if root.is_some() {
                return Err(ParseError::Malformed(
                    "document has more than one root element".to_string(),
                ));
            }
            *root = Some(element);
            Ok(())
        }
    }
}

fn malformed(error: impl std::fmt::Display) -> ParseError {
    ParseError::Malformed(error.to_string())
}
