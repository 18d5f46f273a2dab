//! Append-only checkpoint log.
//!
//! Every fully written child appends one `source\tparent\tchild` line. On
//! start the last non-empty line decides where the batch resumes; a missing or
//! unreadable log starts the batch from the beginning.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::error::{Result, StandoffError};

/// One completed child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckpointRecord {
    /// Annotation-source file the child came from.
    pub source: String,
    /// 1-based parent index.
    pub parent: usize,
    /// 1-based child index within the parent.
    pub child: usize,
}

impl CheckpointRecord {
    pub fn new<S: Into<String>>(source: S, parent: usize, child: usize) -> Self {
        CheckpointRecord {
            source: source.into(),
            parent,
            child,
        }
    }

    /// Parse one log line.
    pub fn parse_line(line: &str) -> Result<Self> {
        // the source name is taken as everything before the last two fields
        let mut fields = line.trim_end_matches(['\r', '\n']).rsplitn(3, '\t');
        let (Some(child), Some(parent), Some(source)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(StandoffError::checkpoint(format!(
                "expected three tab-separated fields: {line:?}"
            )));
        };

        let parse = |field: &str, name: &str| {
            field.trim().parse::<usize>().map_err(|e| {
                StandoffError::checkpoint(format!("invalid {name} index {field:?}: {e}"))
            })
        };
        let parent = parse(parent, "parent")?;
        let child = parse(child, "child")?;
        if parent == 0 || child == 0 {
            return Err(StandoffError::checkpoint(format!(
                "indices are 1-based: {line:?}"
            )));
        }

        Ok(CheckpointRecord::new(source, parent, child))
    }
}

impl fmt::Display for CheckpointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.source, self.parent, self.child)
    }
}

/// Where a batch starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckpointState {
    /// Start with the first parent.
    Fresh,
    /// Continue after the recorded child.
    Resuming(CheckpointRecord),
}

impl CheckpointState {
    pub fn last_record(&self) -> Option<&CheckpointRecord> {
        match self {
            CheckpointState::Fresh => None,
            CheckpointState::Resuming(record) => Some(record),
        }
    }

    /// Whether the whole parent (1-based) was finished in an earlier run.
    pub fn skips_parent(&self, parent: usize) -> bool {
        self.last_record().is_some_and(|r| parent < r.parent)
    }

    /// Whether the child was written in an earlier run.
    pub fn skips_child(&self, parent: usize, child: usize) -> bool {
        self.last_record()
            .is_some_and(|r| parent < r.parent || (parent == r.parent && child <= r.child))
    }

    /// Whether some child of the parent was written in an earlier run.
    pub fn touches_parent(&self, parent: usize) -> bool {
        self.last_record().is_some_and(|r| parent <= r.parent)
    }
}

/// Read the resume position without modifying anything.
///
/// A missing log is `Fresh`; an unparsable last line is an error.
pub fn read_state<P: AsRef<Path>>(path: P) -> Result<CheckpointState> {
    let content = match fs::read_to_string(path.as_ref()) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CheckpointState::Fresh),
        Err(e) => {
            return Err(StandoffError::checkpoint(format!(
                "{}: {e}",
                path.as_ref().display()
            )));
        }
    };

    match content.lines().rev().find(|line| !line.trim().is_empty()) {
        Some(line) => Ok(CheckpointState::Resuming(CheckpointRecord::parse_line(line)?)),
        None => Ok(CheckpointState::Fresh),
    }
}

/// The open checkpoint log of a running batch.
#[derive(Debug)]
pub struct CheckpointLog {
    path: PathBuf,
    file: File,
}

impl CheckpointLog {
    /// Open the log and determine the resume position.
    ///
    /// With `reset`, or when the existing log is missing or corrupt, the log is
    /// truncated and the batch starts fresh.
    pub fn open<P: AsRef<Path>>(path: P, reset: bool) -> Result<(Self, CheckpointState)> {
        let path = path.as_ref().to_path_buf();

        let state = if reset {
            info!("Checkpoint reset requested; starting fresh");
            CheckpointState::Fresh
        } else if !path.exists() {
            warn!(
                "No checkpoint log at {}; starting fresh",
                path.display()
            );
            CheckpointState::Fresh
        } else {
            match read_state(&path) {
                Ok(state) => state,
                Err(e) => {
                    warn!("Unusable checkpoint log {} ({e}); starting fresh", path.display());
                    CheckpointState::Fresh
                }
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        match state {
            CheckpointState::Fresh => options.write(true).create(true).truncate(true),
            CheckpointState::Resuming(_) => options.create(true).append(true),
        };
        let file = options
            .open(&path)
            .map_err(|e| StandoffError::checkpoint(format!("{}: {e}", path.display())))?;

        if let CheckpointState::Resuming(record) = &state {
            info!(
                "Resuming after parent {} child {} ({})",
                record.parent, record.child, record.source
            );
        }

        Ok((CheckpointLog { path, file }, state))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and force it to disk.
    pub fn append(&mut self, record: &CheckpointRecord) -> Result<()> {
        writeln!(self.file, "{record}")
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_data())
            .map_err(|e| StandoffError::checkpoint(format!("{}: {e}", self.path.display())))
    }
}
