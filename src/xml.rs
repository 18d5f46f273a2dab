//! Minimal XML element tree and pretty serializer for output artifacts.
//!
//! Every artifact is built as a fresh [`XmlDocument`]; elements own their
//! attributes, so nothing is shared or mutated between calls.

use std::borrow::Cow;

/// Declaration written at the top of every artifact.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const INDENT: &str = "  ";

/// A node in an element's content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with ordered attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new<S: Into<String>>(name: S) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute, keeping insertion order.
    pub fn attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append a child element.
    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Append a text node.
    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Append a child element in place.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements only.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated text of the direct text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    fn write_to(&self, buf: &mut String, depth: usize) {
        for _ in 0..depth {
            buf.push_str(INDENT);
        }
        buf.push('<');
        buf.push_str(&self.name);
        for (key, value) in &self.attributes {
            buf.push(' ');
            buf.push_str(key);
            buf.push_str("=\"");
            buf.push_str(&escape(value));
            buf.push('"');
        }

        if self.children.is_empty() {
            buf.push_str("/>\n");
            return;
        }

        // text-only content stays on the element's line
        if self.children.iter().all(|n| matches!(n, XmlNode::Text(_))) {
            buf.push('>');
            buf.push_str(&escape(&self.text_content()));
            self.write_close(buf);
            return;
        }

        buf.push_str(">\n");
        for node in &self.children {
            match node {
                XmlNode::Element(e) => e.write_to(buf, depth + 1),
                XmlNode::Text(t) => {
                    for _ in 0..=depth {
                        buf.push_str(INDENT);
                    }
                    buf.push_str(&escape(t));
                    buf.push('\n');
                }
            }
        }
        for _ in 0..depth {
            buf.push_str(INDENT);
        }
        self.write_close(buf);
    }

    fn write_close(&self, buf: &mut String) {
        buf.push_str("</");
        buf.push_str(&self.name);
        buf.push_str(">\n");
    }
}

/// A complete artifact: prolog lines followed by one root element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    prolog: Vec<String>,
    root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        XmlDocument {
            prolog: Vec::new(),
            root,
        }
    }

    /// Add a processing instruction or doctype line after the declaration.
    pub fn with_prolog<S: Into<String>>(mut self, line: S) -> Self {
        self.prolog.push(line.into());
        self
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Serialize with two-space indentation.
    pub fn to_pretty_string(&self) -> String {
        let mut buf = String::with_capacity(256);
        buf.push_str(XML_DECLARATION);
        buf.push('\n');
        for line in &self.prolog {
            buf.push_str(line);
            buf.push('\n');
        }
        self.root.write_to(&mut buf, 0);
        buf
    }
}

/// Escape XML special characters in text and attribute values.
pub fn escape(input: &str) -> Cow<'_, str> {
    if !input
        .bytes()
        .any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\''))
    {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape bare ampersands that do not start an entity or character reference.
///
/// Annotation sources routinely carry `&` as a token; everything else in them
/// is left untouched.
pub fn escape_bare_ampersands(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if starts_with_reference(tail) {
            result.push('&');
        } else {
            result.push_str("&amp;");
        }
        rest = tail;
    }
    result.push_str(rest);
    Cow::Owned(result)
}

fn starts_with_reference(tail: &str) -> bool {
    let Some(end) = tail.find(';') else {
        return false;
    };
    let name = &tail[..end];
    if let Some(hex) = name.strip_prefix("#x") {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(dec) = name.strip_prefix('#') {
        !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit())
    } else {
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
    }
}
