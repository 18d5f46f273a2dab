//! Metadata extraction from metadata-source documents.
//!
//! A metadata source carries an optional corpus-level `<cesHeader>` block and,
//! per division, optional `head` (title), `docAuthor` and `date` elements.
//! Divisions are aligned with the annotation source by position.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use roxmltree::{Document, Node};

use crate::error::Result;
use crate::source::annotation::parsing_options;
use crate::source::{DivisionMap, local_name_eq};

lazy_static! {
    static ref CES_HEADER: Regex =
        Regex::new(r"(?s)<cesHeader\b.*?</cesHeader>").expect("valid cesHeader pattern");
}

/// Title, author and date of one division.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DivisionMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

/// Everything taken from one metadata-source document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataSource {
    /// The raw `<cesHeader>…</cesHeader>` block, verbatim.
    pub corpus_header: Option<String>,

    /// One entry per division element, in document order.
    pub divisions: Vec<DivisionMetadata>,
}

impl MetadataSource {
    /// Parse a decoded metadata document.
    pub fn parse(text: &str) -> Result<Self> {
        let doc = Document::parse_with_options(text, parsing_options())?;
        let root = doc.root_element();
        let map = DivisionMap::build(root);

        let mut divisions = vec![DivisionMetadata::default(); map.len()];
        let mut seen = vec![[false; 3]; map.len()];

        // the first matching element of a division decides, even when empty
        for node in root.descendants().filter(|n| n.is_element()) {
            let Some(idx) = map.owner(node) else {
                continue;
            };
            let target = &mut divisions[idx];
            if local_name_eq(&node, "head") && !seen[idx][0] {
                seen[idx][0] = true;
                target.title = non_empty(normalize_whitespace(&text_of(node)));
            } else if local_name_eq(&node, "docAuthor") && !seen[idx][1] {
                seen[idx][1] = true;
                target.author = non_empty(normalize_whitespace(&text_of(node)));
            } else if local_name_eq(&node, "date") && !seen[idx][2] {
                seen[idx][2] = true;
                target.date = node
                    .attributes()
                    .find(|a| a.name().eq_ignore_ascii_case("iso8601"))
                    .map(|a| a.value().to_string())
                    .or_else(|| non_empty(normalize_whitespace(&text_of(node))));
            }
        }

        Ok(MetadataSource {
            corpus_header: corpus_header(text),
            divisions,
        })
    }

    /// Parse, falling back to the corpus header alone when the document is
    /// not well-formed XML.
    pub fn parse_lenient(text: &str, origin: &str) -> Self {
        match Self::parse(text) {
            Ok(source) => source,
            Err(e) => {
                warn!("Metadata of {origin} is not well-formed ({e}); division headers left empty");
                MetadataSource {
                    corpus_header: corpus_header(text),
                    divisions: Vec::new(),
                }
            }
        }
    }

    /// Metadata of the division at `index`, empty when absent.
    pub fn division(&self, index: usize) -> DivisionMetadata {
        self.divisions.get(index).cloned().unwrap_or_default()
    }
}

fn corpus_header(text: &str) -> Option<String> {
    CES_HEADER.find(text).map(|m| m.as_str().to_string())
}

fn non_empty(text: String) -> Option<String> {
    Some(text).filter(|t| !t.is_empty())
}

fn text_of(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Collapse runs of whitespace (including tabs and newlines) to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
