//! Token stream parser.
//!
//! Turns the raw, sentence-delimited annotation lines of one division into a
//! [`TokenStream`]. Parsing never fails: short lines are padded with the
//! [`NOT_AVAILABLE`](crate::annotation::field::NOT_AVAILABLE) sentinel, and
//! lines without any column act as the no-space marker.
//!
//! # Examples
//!
//! ```
//! use standoff::annotation::parser::{DivisionLines, TokenStreamParser};
//!
//! let division = DivisionLines::single_paragraph(vec![vec![
//!     "Hello\thello\tINT".to_string(),
//!     "###NOSPACE###".to_string(),
//!     "!\t!\tPUNCT".to_string(),
//! ]]);
//!
//! let stream = TokenStreamParser::default().parse(&division);
//! assert_eq!(stream.raw_text(), "Hello!");
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::annotation::field::TokenRecord;
use crate::annotation::stream::{BoundaryMarker, TokenStream};

/// Marker line meaning "no separator before the next token".
pub const DEFAULT_NO_SPACE_MARKER: &str = "###NOSPACE###";

/// Lines of one sentence, one annotation line per entry.
pub type SentenceLines = Vec<String>;

/// Sentences of one paragraph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphLines {
    pub sentences: Vec<SentenceLines>,
}

/// Raw annotation lines of one division, grouped by paragraph and sentence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionLines {
    pub paragraphs: Vec<ParagraphLines>,
}

impl DivisionLines {
    /// A division without paragraph markup: all sentences in one paragraph.
    pub fn single_paragraph(sentences: Vec<SentenceLines>) -> Self {
        DivisionLines {
            paragraphs: vec![ParagraphLines { sentences }],
        }
    }
}

/// Parser from [`DivisionLines`] to [`TokenStream`].
#[derive(Clone, Debug)]
pub struct TokenStreamParser {
    no_space_marker: String,
}

impl Default for TokenStreamParser {
    fn default() -> Self {
        Self::new(DEFAULT_NO_SPACE_MARKER)
    }
}

impl TokenStreamParser {
    /// Create a parser recognising the given no-space marker line.
    pub fn new<S: Into<String>>(no_space_marker: S) -> Self {
        TokenStreamParser {
            no_space_marker: no_space_marker.into(),
        }
    }

    /// The marker line this parser recognises.
    pub fn no_space_marker(&self) -> &str {
        &self.no_space_marker
    }

    /// Parse one division.
    ///
    /// A pending no-space flag is consumed by the next record produced, even
    /// when a sentence boundary lies in between.
    pub fn parse(&self, division: &DivisionLines) -> TokenStream {
        let mut stream = TokenStream::new();
        let mut attach_next = false;

        for paragraph in &division.paragraphs {
            for sentence in &paragraph.sentences {
                for line in sentence {
                    let line = line.trim();
                    if self.is_no_space_marker(line) {
                        attach_next = true;
                        continue;
                    }

                    let record = TokenRecord::from_columns(line.split('\t'))
                        .with_attachment(attach_next);
                    if record.missing_fields().next().is_some() {
                        debug!("Padded short annotation line: {line:?}");
                    }
                    stream.push_token(record);
                    attach_next = false;
                }
                stream.push_boundary(BoundaryMarker::SentenceEnd);
            }
            stream.push_boundary(BoundaryMarker::ParagraphEnd);
        }

        stream
    }

    fn is_no_space_marker(&self, line: &str) -> bool {
        line.is_empty() || line == self.no_space_marker
    }
}
