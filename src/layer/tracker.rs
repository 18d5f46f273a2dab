//! Offset tracker.
//!
//! Walks a [`TokenStream`] once and computes, in character offsets over the
//! reconstructed raw text:
//!
//! - one [`TokenSpan`] per token record, `to - from == chars(word)`;
//! - one sentence span per closed sentence and one paragraph span per closed
//!   paragraph.
//!
//! ```text
//! tokens:   "Jó"  "napot"  "!"(attached)  | "Szia" |
//! raw text:  Jó napot! Szia
//! spans:    [0,2) [3,8)   [8,9)             [10,14)
//! sentence: [0,9)                           [10,14)
//! ```
//!
//! A boundary marker closes a span from the first token after the previous
//! boundary of the same granularity up to the last token seen. A marker with
//! no token since that previous boundary closes nothing.

use log::debug;

use crate::annotation::field::TokenRecord;
use crate::annotation::stream::{BoundaryMarker, StreamItem, TokenStream};
use crate::layer::kind::Layer;

/// A `[from, to)` range of character offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

impl Span {
    pub fn new(from: usize, to: usize) -> Self {
        Span { from, to }
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// The span of one token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenSpan<'a> {
    /// Sequential, 0-based, one per token.
    pub id: usize,
    pub span: Span,
    pub record: &'a TokenRecord,
}

/// All spans of one division.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackedDivision<'a> {
    pub tokens: Vec<TokenSpan<'a>>,
    pub sentences: Vec<Span>,
    pub paragraphs: Vec<Span>,
}

impl TrackedDivision<'_> {
    /// Boundary spans of a structural layer; empty for content layers.
    pub fn boundaries(&self, layer: Layer) -> &[Span] {
        match layer {
            Layer::Sentences => &self.sentences,
            Layer::Paragraphs => &self.paragraphs,
            _ => &[],
        }
    }
}

#[derive(Debug, Default)]
struct OpenBoundary {
    start: Option<usize>,
}

impl OpenBoundary {
    fn observe(&mut self, token_from: usize) {
        self.start.get_or_insert(token_from);
    }

    fn close(&mut self, last_to: usize) -> Option<Span> {
        self.start.take().map(|from| Span::new(from, last_to))
    }
}

/// Computes spans for a token stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffsetTracker;

impl OffsetTracker {
    pub fn new() -> Self {
        OffsetTracker
    }

    /// Walk the stream once.
    pub fn track<'a>(&self, stream: &'a TokenStream) -> TrackedDivision<'a> {
        let mut tracked = TrackedDivision::default();
        let mut cursor = 0usize;
        let mut last_to = 0usize;
        let mut sentence = OpenBoundary::default();
        let mut paragraph = OpenBoundary::default();

        for item in stream.items() {
            match item {
                StreamItem::Token(record) => {
                    let id = tracked.tokens.len();
                    if id != 0 && record.attaches_without_space {
                        // cancel the separator
                        cursor -= 1;
                    }
                    let to = cursor + record.char_len();
                    tracked.tokens.push(TokenSpan {
                        id,
                        span: Span::new(cursor, to),
                        record,
                    });
                    sentence.observe(cursor);
                    paragraph.observe(cursor);
                    last_to = to;
                    cursor = to + 1;
                }
                StreamItem::Boundary(BoundaryMarker::SentenceEnd) => {
                    match sentence.close(last_to) {
                        Some(span) => tracked.sentences.push(span),
                        None => debug!("Sentence boundary without tokens at offset {last_to}"),
                    }
                }
                StreamItem::Boundary(BoundaryMarker::ParagraphEnd) => {
                    match paragraph.close(last_to) {
                        Some(span) => tracked.paragraphs.push(span),
                        None => debug!("Paragraph boundary without tokens at offset {last_to}"),
                    }
                }
            }
        }

        tracked
    }
}
