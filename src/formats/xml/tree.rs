// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Owned XML element tree.
//!
//! One XML document is one atomic record source, so the whole document
//! is parsed into an owned tree before any node processor runs. The
//! accessors fail loudly when a required child tag or attribute is
//! absent instead of returning a silently wrong default.

use std::collections::BTreeMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Error raised while parsing or reading an XML document.
#[derive(Debug, Clone, Error)]
pub enum XmlError {
    /// The document is not well-formed.
    #[error("malformed XML: {0}")]
    Malformed(String),
    /// A required child tag is absent.
    #[error("element '{element}' is missing required child '{child}'")]
    MissingChild {
        /// Parent element name
        element: String,
        /// Missing child tag
        child: String,
    },
    /// A required attribute is absent.
    #[error("element '{element}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Element name
        element: String,
        /// Missing attribute name
        attribute: String,
    },
}

/// One element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Tag name, as written (prefix included)
    pub name: String,
    /// Attributes, as written
    pub attributes: BTreeMap<String, String>,
    /// Concatenated text content of this element
    pub text: String,
    /// Child elements, in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// First child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child with the given tag name, or a missing-child error.
    pub fn require_child(&self, name: &str) -> Result<&XmlElement, XmlError> {
        self.child(name).ok_or_else(|| XmlError::MissingChild {
            element: self.name.clone(),
            child: name.to_string(),
        })
    }

    /// Text content of a child tag, if the child exists.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Text content of a required child tag.
    pub fn require_child_text(&self, name: &str) -> Result<&str, XmlError> {
        Ok(self.require_child(name)?.text.as_str())
    }

    /// Attribute value, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, or a missing-attribute error.
    pub fn require_attribute(&self, name: &str) -> Result<&str, XmlError> {
        self.attribute(name)
            .ok_or_else(|| XmlError::MissingAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
            })
    }
}

/// Parse a whole document into its root element.
pub fn parse_document(input: &mut dyn Read) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_reader(BufReader::new(input));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                stack.push(element_from_start(&start)?);
            }
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::Malformed("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(open) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| XmlError::Malformed(e.to_string()))?;
                    append_text(open, text.trim());
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(open) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data).to_string();
                    append_text(open, text.trim());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(XmlError::Malformed(e.to_string())),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(XmlError::Malformed(format!(
            "unclosed element '{}'",
            stack[stack.len() - 1].name
        )));
    }
    root.ok_or_else(|| XmlError::Malformed("document has no root element".to_string()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut attributes = BTreeMap::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::Malformed(e.to_string()))?
            .to_string();
        attributes.insert(key, value);
    }
    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn append_text(element: &mut XmlElement, text: &str) {
    if text.is_empty() {
        return;
    }
    if !element.text.is_empty() {
        element.text.push(' ');
    }
    element.text.push_str(text);
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::Malformed(
            "document has more than one root element".to_string(),
        ));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> XmlElement {
        parse_document(&mut text.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_nested_document() {
        let root = parse(
            r#"<assessment xsi:type="ns:Reaction"><part id="1"><value>12</value></part></assessment>"#,
        );
        assert_eq!(root.name, "assessment");
        assert_eq!(root.attribute("xsi:type"), Some("ns:Reaction"));
        let part = root.require_child("part").unwrap();
        assert_eq!(part.attribute("id"), Some("1"));
        assert_eq!(part.require_child_text("value").unwrap(), "12");
    }

    #[test]
    fn test_missing_child_is_loud() {
        let root = parse("<a><b/></a>");
        let err = root.require_child("c").unwrap_err();
        assert!(err.to_string().contains("missing required child 'c'"));
    }

    #[test]
    fn test_missing_attribute_is_loud() {
        let root = parse("<a/>");
        let err = root.require_attribute("id").unwrap_err();
        assert!(err.to_string().contains("missing required attribute 'id'"));
    }

    #[test]
    fn test_unbalanced_document_rejected() {
        assert!(parse_document(&mut "<a><b></a>".as_bytes()).is_err());
        assert!(parse_document(&mut "".as_bytes()).is_err());
    }

    #[test]
    fn test_children_named() {
        let root = parse("<list><item>1</item><other/><item>2</item></list>");
        let items: Vec<_> = root.children_named("item").map(|i| i.text.as_str()).collect();
        assert_eq!(items, ["1", "2"]);
    }
}
