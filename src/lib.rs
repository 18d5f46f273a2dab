//! # standoff
//!
//! Converts token-annotated corpus documents into per-document standoff
//! layers: a raw text, a text header, and one span document per annotation
//! layer, all sharing the same character offsets.
//!
//! ## Features
//!
//! - Eleven-column token annotation with short-line padding
//! - Single offset walk shared by every layer
//! - Metadata pairing by filename, including split fragments
//! - Resumable batches through an append-only checkpoint log
//!
//! ## Example
//!
//! ```
//! use standoff::annotation::parser::{DivisionLines, TokenStreamParser};
//! use standoff::pipeline::encode_division;
//! use standoff::source::metadata::DivisionMetadata;
//!
//! let division = DivisionLines::single_paragraph(vec![vec![
//!     "Jó\tjó\tMN".to_string(),
//!     "napot\tnap\tFN".to_string(),
//! ]]);
//! let stream = TokenStreamParser::default().parse(&division);
//! assert_eq!(stream.raw_text(), "Jó napot");
//!
//! let artifacts = encode_division("DOC000001.000001", &stream, &DivisionMetadata::default());
//! assert_eq!(artifacts.len(), 14);
//! ```

pub mod annotation;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod header;
pub mod layer;
pub mod matcher;
pub mod numbering;
pub mod pipeline;
pub mod source;
pub mod xml;

pub mod prelude {
    pub use crate::config::ConvertConfig;
    pub use crate::error::{Result, StandoffError};
    pub use crate::pipeline::{BatchDriver, ConversionSummary, FileSystemSink, MemorySink};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
