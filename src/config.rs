//! Configuration for a conversion run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotation::parser::DEFAULT_NO_SPACE_MARKER;
use crate::error::{Result, StandoffError};
use crate::numbering::DEFAULT_ID_WIDTH;

/// Configuration for the batch driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Root of the output tree.
    pub output_dir: PathBuf,

    /// Root directory searched recursively for metadata-source files.
    pub metadata_root: PathBuf,

    /// Append-only checkpoint log.
    pub checkpoint_path: PathBuf,

    /// Ignore any existing checkpoint and start over.
    pub reset: bool,

    /// When starting over, remove everything under `output_dir` first.
    pub clean_output: bool,

    /// Prefix of every parent directory name.
    pub corpus_name: String,

    /// Number of digits in parent and child identifiers.
    pub id_width: usize,

    /// Fixed prefix stripped from annotation-source basenames before matching.
    pub annotation_prefix: String,

    /// Character encoding of annotation and metadata sources (WHATWG label).
    pub source_encoding: String,

    /// Marker line meaning "no space before the next token".
    pub no_space_marker: String,

    /// Abort the run on an unreadable source instead of skipping it.
    pub fail_fast: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            metadata_root: PathBuf::from("."),
            checkpoint_path: PathBuf::from("checkpoint.tsv"),
            reset: false,
            clean_output: false,
            corpus_name: "DOC".to_string(),
            id_width: DEFAULT_ID_WIDTH,
            annotation_prefix: "noske_".to_string(),
            source_encoding: "iso-8859-2".to_string(),
            no_space_marker: DEFAULT_NO_SPACE_MARKER.to_string(),
            fail_fast: false,
        }
    }
}

impl ConvertConfig {
    /// Create a configuration with the three required locations.
    pub fn new<P, Q, R>(output_dir: P, metadata_root: Q, checkpoint_path: R) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
        R: Into<PathBuf>,
    {
        Self {
            output_dir: output_dir.into(),
            metadata_root: metadata_root.into(),
            checkpoint_path: checkpoint_path.into(),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file; missing keys take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ConvertConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Set whether to start over.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Set whether a reset also clears the output tree.
    pub fn with_clean_output(mut self, clean_output: bool) -> Self {
        self.clean_output = clean_output;
        self
    }

    /// Set the parent directory prefix.
    pub fn with_corpus_name<S: Into<String>>(mut self, corpus_name: S) -> Self {
        self.corpus_name = corpus_name.into();
        self
    }

    /// Set the identifier width.
    pub fn with_id_width(mut self, id_width: usize) -> Self {
        self.id_width = id_width;
        self
    }

    /// Set the annotation filename prefix.
    pub fn with_annotation_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.annotation_prefix = prefix.into();
        self
    }

    /// Set the source encoding label.
    pub fn with_source_encoding<S: Into<String>>(mut self, label: S) -> Self {
        self.source_encoding = label.into();
        self
    }

    /// Set the no-space marker line.
    pub fn with_no_space_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.no_space_marker = marker.into();
        self
    }

    /// Set whether unreadable sources abort the run.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Check the configuration before a run.
    pub fn validate(&self) -> Result<()> {
        if self.id_width == 0 {
            return Err(StandoffError::invalid_config("id_width must be positive"));
        }
        if encoding_rs::Encoding::for_label(self.source_encoding.as_bytes()).is_none() {
            return Err(StandoffError::invalid_config(format!(
                "unknown source encoding: {}",
                self.source_encoding
            )));
        }
        if self.no_space_marker.contains('\t') {
            return Err(StandoffError::invalid_config(
                "no_space_marker must not contain a tab",
            ));
        }
        Ok(())
    }
}
