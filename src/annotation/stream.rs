//! Ordered token/boundary stream of one division.

use serde::{Deserialize, Serialize};

use crate::annotation::field::TokenRecord;

/// Structural boundary positioned between tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryMarker {
    SentenceEnd,
    ParagraphEnd,
}

/// One element of a [`TokenStream`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamItem {
    Token(TokenRecord),
    Boundary(BoundaryMarker),
}

/// Tokens and boundary markers of one division, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStream {
    items: Vec<StreamItem>,
}

impl TokenStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        TokenStream { items: Vec::new() }
    }

    /// Append a token record.
    pub fn push_token(&mut self, record: TokenRecord) {
        self.items.push(StreamItem::Token(record));
    }

    /// Append a boundary marker.
    pub fn push_boundary(&mut self, marker: BoundaryMarker) {
        self.items.push(StreamItem::Boundary(marker));
    }

    /// All items in order.
    pub fn items(&self) -> &[StreamItem] {
        &self.items
    }

    /// Token records only, in order.
    pub fn tokens(&self) -> impl Iterator<Item = &TokenRecord> {
        self.items.iter().filter_map(|item| match item {
            StreamItem::Token(record) => Some(record),
            StreamItem::Boundary(_) => None,
        })
    }

    /// Number of token records.
    pub fn token_count(&self) -> usize {
        self.tokens().count()
    }

    /// Whether the stream holds no token at all.
    pub fn is_empty(&self) -> bool {
        self.token_count() == 0
    }

    /// Reconstruct the raw text of the division.
    ///
    /// Surface forms are joined by single spaces, except that no space is
    /// inserted before a token that attaches to its predecessor.
    pub fn raw_text(&self) -> String {
        let mut text = String::new();
        for (i, record) in self.tokens().enumerate() {
            if i > 0 && !record.attaches_without_space {
                text.push(' ');
            }
            text.push_str(record.word());
        }
        text
    }
}
