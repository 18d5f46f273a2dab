//! Pairing annotation sources with metadata sources.
//!
//! Metadata files are indexed by basename minus the last extension. An
//! annotation file resolves through its basename minus the configured prefix
//! and the last extension; split fragments such as `regeny_003b.xml` fall back
//! to the key with the three-digit fragment number removed (`regenyb`).
//!
//! Consecutive inputs resolving to the same metadata file form one parent.
//! Inputs may be given as glob patterns; see [`expand_inputs`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::error::{Result, StandoffError};

lazy_static! {
    static ref SPLIT_FRAGMENT: Regex =
        Regex::new(r"^(.+)_(\d{3})(.*)\.([^.]+)$").expect("valid fragment pattern");
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn strip_last_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// Key of a metadata file: basename minus its last extension.
pub fn metadata_key(path: &Path) -> Option<String> {
    file_name(path).map(|name| strip_last_extension(name).to_string())
}

/// Key of an annotation file: basename minus `prefix` minus its last extension.
pub fn annotation_key(path: &Path, prefix: &str) -> Option<String> {
    let name = file_name(path)?;
    let name = name.strip_prefix(prefix).unwrap_or(name);
    Some(strip_last_extension(name).to_string())
}

/// Fallback key of a split fragment, with the `_NNN` fragment number removed.
pub fn split_fragment_key(path: &Path, prefix: &str) -> Option<String> {
    let name = file_name(path)?;
    let name = name.strip_prefix(prefix).unwrap_or(name);
    SPLIT_FRAGMENT
        .captures(name)
        .map(|caps| format!("{}{}", &caps[1], &caps[3]))
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Expand glob patterns among `inputs`, keeping plain paths as given.
///
/// Matches of one pattern are sorted; input order is otherwise preserved.
/// `**` matches across directories.
pub fn expand_inputs<I, P>(inputs: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut expanded = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        let Some(pattern) = input.to_str().filter(|s| is_pattern(s)) else {
            expanded.push(input.to_path_buf());
            continue;
        };

        let paths = glob::glob(pattern).map_err(|e| {
            StandoffError::invalid_config(format!("invalid input pattern {pattern:?}: {e}"))
        })?;
        let mut matched = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => matched.push(path),
                Ok(_) => {}
                Err(e) => warn!("Unreadable entry while expanding {pattern}: {e}"),
            }
        }
        if matched.is_empty() {
            warn!("Input pattern {pattern} matched no files");
        }
        matched.sort();
        expanded.extend(matched);
    }
    Ok(expanded)
}

/// Metadata files indexed by key.
#[derive(Clone, Debug, Default)]
pub struct MetadataIndex {
    by_key: HashMap<String, PathBuf>,
}

impl MetadataIndex {
    /// Index every file below `root`, recursively.
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self> {
        let mut files = Vec::new();
        collect_files(root.as_ref(), &mut files)?;
        Ok(Self::from_paths(files))
    }

    /// Index the given paths; the first path wins on a duplicate key.
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut by_key: HashMap<String, PathBuf> = HashMap::new();
        for path in paths {
            let Some(key) = metadata_key(&path) else {
                continue;
            };
            if let Some(existing) = by_key.get(&key) {
                warn!(
                    "Duplicate metadata key {key}: keeping {}, ignoring {}",
                    existing.display(),
                    path.display()
                );
                continue;
            }
            by_key.insert(key, path);
        }
        MetadataIndex { by_key }
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.by_key.get(key).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

// Directory entries are sorted so that duplicate resolution is stable.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// One output parent: a metadata file and the annotation fragments it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentGroup {
    pub metadata: PathBuf,
    pub fragments: Vec<PathBuf>,
}

/// The result of matching a batch of annotation files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchPlan {
    /// Parents in input order; parent `n` (1-based) is `parents[n - 1]`.
    pub parents: Vec<ParentGroup>,

    /// Inputs for which no metadata file was found.
    pub unmatched: Vec<PathBuf>,
}

impl MatchPlan {
    pub fn fragment_count(&self) -> usize {
        self.parents.iter().map(|p| p.fragments.len()).sum()
    }
}

/// Resolves annotation files against a [`MetadataIndex`].
#[derive(Clone, Debug)]
pub struct DocumentMatcher {
    index: MetadataIndex,
    prefix: String,
}

impl DocumentMatcher {
    pub fn new<S: Into<String>>(index: MetadataIndex, prefix: S) -> Self {
        DocumentMatcher {
            index,
            prefix: prefix.into(),
        }
    }

    pub fn index(&self) -> &MetadataIndex {
        &self.index
    }

    /// Find the metadata file for one annotation file.
    pub fn resolve(&self, path: &Path) -> Option<&Path> {
        let key = annotation_key(path, &self.prefix)?;
        if let Some(found) = self.index.get(&key) {
            return Some(found);
        }

        let fallback = split_fragment_key(path, &self.prefix)?;
        let found = self.index.get(&fallback)?;
        debug!(
            "{} resolved as split fragment of {fallback}",
            path.display()
        );
        Some(found)
    }

    /// Match every input and group consecutive hits into parents.
    pub fn plan<I, P>(&self, inputs: I) -> MatchPlan
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut plan = MatchPlan::default();

        for input in inputs {
            let input = input.as_ref();
            let Some(metadata) = self.resolve(input) else {
                warn!("No metadata found for {}; skipped", input.display());
                plan.unmatched.push(input.to_path_buf());
                continue;
            };

            match plan.parents.last_mut() {
                Some(last) if last.metadata == metadata => {
                    last.fragments.push(input.to_path_buf());
                }
                _ => {
                    if plan.parents.iter().any(|p| p.metadata == metadata) {
                        warn!(
                            "{} repeats metadata {} after other inputs; starting a new parent",
                            input.display(),
                            metadata.display()
                        );
                    }
                    plan.parents.push(ParentGroup {
                        metadata: metadata.to_path_buf(),
                        fragments: vec![input.to_path_buf()],
                    });
                }
            }
        }

        plan
    }
}
