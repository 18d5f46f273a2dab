//! Destinations for converted artifacts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, StandoffError};
use crate::layer::encoder::Artifact;

/// Name of the per-parent corpus header file.
pub const PARENT_HEADER_FILE: &str = "header.xml";

/// A trait for the place converted documents are written to.
///
/// A child is written as a unit: after `write_child` returns `Ok` all of its
/// artifacts are in place, and after an error none of them are.
pub trait ArtifactSink: std::fmt::Debug {
    /// Write the corpus header of a parent.
    fn write_parent_header(&mut self, parent: &str, content: &str) -> Result<()>;

    /// Write every artifact of one child. Returns the number written.
    fn write_child(&mut self, parent: &str, child: &str, artifacts: &[Artifact]) -> Result<usize>;

    /// Remove everything written so far, including earlier runs.
    ///
    /// Paths in `preserve` (and the directories leading to them) survive.
    fn clear(&mut self, preserve: &[&Path]) -> Result<()>;
}

/// Writes artifacts below a root directory.
///
/// Each child is staged in a hidden sibling directory and renamed into place
/// once complete.
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    root: PathBuf,
}

impl FileSystemSink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        FileSystemSink {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final directory of a child.
    pub fn child_dir(&self, parent: &str, child: &str) -> PathBuf {
        self.root.join(parent).join(child)
    }

    fn staging_dir(&self, parent: &str, child: &str) -> PathBuf {
        self.root.join(parent).join(format!(".{child}.partial"))
    }

    fn stage(&self, staging: &Path, artifacts: &[Artifact]) -> Result<()> {
        fs::create_dir_all(staging)?;
        for artifact in artifacts {
            let path = staging.join(artifact.relative_path());
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(&path, artifact.document.to_pretty_string())?;
        }
        Ok(())
    }
}

impl ArtifactSink for FileSystemSink {
    fn write_parent_header(&mut self, parent: &str, content: &str) -> Result<()> {
        let dir = self.root.join(parent);
        fs::create_dir_all(&dir)?;

        let staged = dir.join(format!(".{PARENT_HEADER_FILE}.partial"));
        fs::write(&staged, content)?;
        fs::rename(&staged, dir.join(PARENT_HEADER_FILE))?;
        Ok(())
    }

    fn write_child(&mut self, parent: &str, child: &str, artifacts: &[Artifact]) -> Result<usize> {
        let staging = self.staging_dir(parent, child);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }

        if let Err(e) = self.stage(&staging, artifacts) {
            let _ = fs::remove_dir_all(&staging);
            return Err(StandoffError::output(format!(
                "staging {parent}/{child} failed: {e}"
            )));
        }

        let target = self.child_dir(parent, child);
        if target.exists() {
            debug!("Replacing existing {}", target.display());
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&staging, &target).map_err(|e| {
            StandoffError::output(format!("committing {}: {e}", target.display()))
        })?;

        Ok(artifacts.len())
    }

    fn clear(&mut self, preserve: &[&Path]) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }
        let root = std::path::absolute(&self.root)?;
        let keep = preserve
            .iter()
            .map(std::path::absolute)
            .collect::<std::io::Result<Vec<_>>>()?;
        clear_dir(&root, &keep)
    }
}

fn clear_dir(dir: &Path, keep: &[PathBuf]) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if keep.iter().any(|k| *k == path) {
            debug!("Keeping {}", path.display());
            continue;
        }
        if path.is_dir() {
            if keep.iter().any(|k| k.starts_with(&path)) {
                clear_dir(&path, keep)?;
            } else {
                fs::remove_dir_all(&path)?;
            }
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Keeps rendered artifacts in memory, keyed by their output path.
///
/// This is useful for testing.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered content at `parent/child/group/name.xml` style paths.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl ArtifactSink for MemorySink {
    fn write_parent_header(&mut self, parent: &str, content: &str) -> Result<()> {
        self.files
            .insert(format!("{parent}/{PARENT_HEADER_FILE}"), content.to_string());
        Ok(())
    }

    fn write_child(&mut self, parent: &str, child: &str, artifacts: &[Artifact]) -> Result<usize> {
        let prefix = format!("{parent}/{child}/");
        self.files.retain(|path, _| !path.starts_with(&prefix));
        for artifact in artifacts {
            self.files.insert(
                format!("{prefix}{}", artifact.relative_path()),
                artifact.document.to_pretty_string(),
            );
        }
        Ok(artifacts.len())
    }

    fn clear(&mut self, _preserve: &[&Path]) -> Result<()> {
        self.files.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::text_header;
    use crate::layer::encoder::LayerEncoder;
    use crate::source::metadata::DivisionMetadata;

    fn sample_artifacts() -> Vec<Artifact> {
        let encoder = LayerEncoder::new("DOC000001.000001");
        vec![
            encoder.encode_raw_text("Jó napot"),
            text_header("DOC000001.000001", &DivisionMetadata::default()),
        ]
    }

    #[test]
    fn test_file_system_sink_commit() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSystemSink::new(dir.path());

        let written = sink
            .write_child("DOC000001", "000001", &sample_artifacts())
            .unwrap();
        assert_eq!(written, 2);

        let child = sink.child_dir("DOC000001", "000001");
        assert!(child.join("data.xml").is_file());
        assert!(child.join("header.xml").is_file());
        assert!(!dir.path().join("DOC000001").join(".000001.partial").exists());

        // rewriting replaces the previous directory
        sink.write_child("DOC000001", "000001", &sample_artifacts()[..1])
            .unwrap();
        assert!(!child.join("header.xml").exists());
    }

    #[test]
    fn test_file_system_sink_parent_header_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSystemSink::new(dir.path().join("out"));

        sink.write_parent_header("DOC000001", "<idsHeader/>").unwrap();
        let header = sink.root().join("DOC000001").join(PARENT_HEADER_FILE);
        assert_eq!(fs::read_to_string(&header).unwrap(), "<idsHeader/>");

        sink.clear(&[]).unwrap();
        assert!(!header.exists());
        assert!(sink.root().exists());
    }

    #[test]
    fn test_clear_keeps_preserved_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        let mut sink = FileSystemSink::new(&root);
        sink.write_child("DOC000001", "000001", &sample_artifacts())
            .unwrap();

        let checkpoint = root.join("state").join("checkpoint.tsv");
        fs::create_dir_all(checkpoint.parent().unwrap()).unwrap();
        fs::write(&checkpoint, "a.xml\t1\t1\n").unwrap();
        fs::write(root.join("state").join("stale.txt"), "x").unwrap();

        sink.clear(&[checkpoint.as_path()]).unwrap();

        assert_eq!(fs::read_to_string(&checkpoint).unwrap(), "a.xml\t1\t1\n");
        assert!(!root.join("state").join("stale.txt").exists());
        assert!(!root.join("DOC000001").exists());
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.write_child("DOC000001", "000001", &sample_artifacts())
            .unwrap();
        sink.write_parent_header("DOC000001", "<idsHeader/>").unwrap();

        assert_eq!(sink.file_count(), 3);
        assert!(sink.get("DOC000001/000001/data.xml").unwrap().contains("Jó napot"));
        assert_eq!(sink.get("DOC000001/header.xml"), Some("<idsHeader/>"));
    }
}
