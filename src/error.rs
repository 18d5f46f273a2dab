//! Error types for the standoff converter.
//!
//! All fallible operations return [`StandoffError`]. Conditions that the batch
//! recovers from locally (short annotation lines, unmatched metadata, a missing
//! checkpoint log) never become errors; they are logged where they happen.
//!
//! # Examples
//!
//! ```
//! use standoff::error::{Result, StandoffError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(StandoffError::invalid_config("id width must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for standoff conversion.
#[derive(Error, Debug)]
pub enum StandoffError {
    /// I/O errors (reading sources, writing artifacts, the checkpoint log)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A source document could not be decoded or parsed
    #[error("Source error: {0}")]
    Source(String),

    /// Malformed XML in an annotation or metadata source
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Checkpoint log could not be read or appended
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// A parent or child sequence number does not fit the identifier width
    #[error("Identifier overflow: index {index} does not fit in {width} digits")]
    IdentifierOverflow { index: usize, width: usize },

    /// Output artifacts could not be staged or committed
    #[error("Output error: {0}")]
    Output(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with StandoffError.
pub type Result<T> = std::result::Result<T, StandoffError>;

impl StandoffError {
    /// Create a new source error.
    pub fn source<S: Into<String>>(msg: S) -> Self {
        StandoffError::Source(msg.into())
    }

    /// Create a new checkpoint error.
    pub fn checkpoint<S: Into<String>>(msg: S) -> Self {
        StandoffError::Checkpoint(msg.into())
    }

    /// Create a new output error.
    pub fn output<S: Into<String>>(msg: S) -> Self {
        StandoffError::Output(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        StandoffError::InvalidConfig(msg.into())
    }

    /// Whether the batch may skip the offending file and continue.
    ///
    /// Decoding and parsing failures are file-local; everything else means the
    /// output tree or the checkpoint can no longer be trusted.
    pub fn is_file_local(&self) -> bool {
        matches!(self, StandoffError::Source(_) | StandoffError::Xml(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = StandoffError::source("bad bytes");
        assert_eq!(error.to_string(), "Source error: bad bytes");

        let error = StandoffError::checkpoint("unreadable");
        assert_eq!(error.to_string(), "Checkpoint error: unreadable");

        let error = StandoffError::IdentifierOverflow {
            index: 1_000_000,
            width: 6,
        };
        assert_eq!(
            error.to_string(),
            "Identifier overflow: index 1000000 does not fit in 6 digits"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let standoff_error = StandoffError::from(io_error);

        match standoff_error {
            StandoffError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_file_local_classification() {
        assert!(StandoffError::source("x").is_file_local());
        assert!(!StandoffError::checkpoint("x").is_file_local());
        assert!(!StandoffError::IdentifierOverflow { index: 10, width: 1 }.is_file_local());
    }
}
