//! Decoding source files into text.

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{Result, StandoffError};
use crate::xml::escape_bare_ampersands;

/// Decodes source bytes with a fixed, configured encoding.
#[derive(Clone, Copy, Debug)]
pub struct SourceReader {
    encoding: &'static Encoding,
}

impl SourceReader {
    /// Create a reader for a WHATWG encoding label such as `iso-8859-2`.
    pub fn new(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| {
            StandoffError::invalid_config(format!("unknown source encoding: {label}"))
        })?;
        Ok(SourceReader { encoding })
    }

    /// Name of the encoding in use.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode raw bytes; malformed sequences are an error, not replaced.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| {
                StandoffError::source(format!("input is not valid {}", self.encoding.name()))
            })
    }

    /// Read and decode a file, repairing bare ampersands for the XML parser.
    ///
    /// Unreadable and undecodable files both surface as source errors.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| StandoffError::source(format!("{}: {e}", path.display())))?;
        let text = self
            .decode(&bytes)
            .map_err(|e| StandoffError::source(format!("{}: {e}", path.display())))?;
        Ok(escape_bare_ampersands(&text).into_owned())
    }
}
