//! Sequential batch conversion.

use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::annotation::parser::TokenStreamParser;
use crate::annotation::stream::TokenStream;
use crate::checkpoint::{CheckpointLog, CheckpointRecord, CheckpointState};
use crate::config::ConvertConfig;
use crate::error::{Result, StandoffError};
use crate::header::{corpus_header, text_header};
use crate::layer::encoder::{Artifact, LayerEncoder};
use crate::layer::tracker::OffsetTracker;
use crate::matcher::{DocumentMatcher, MatchPlan, MetadataIndex, ParentGroup};
use crate::numbering::IdentifierSequence;
use crate::pipeline::sink::{ArtifactSink, FileSystemSink};
use crate::source::annotation::AnnotationSource;
use crate::source::metadata::{DivisionMetadata, MetadataSource};
use crate::source::reader::SourceReader;

/// Encode every artifact of one child document.
///
/// The raw text and the text header come first, followed by the span layers.
pub fn encode_division(
    docid: &str,
    stream: &TokenStream,
    metadata: &DivisionMetadata,
) -> Vec<Artifact> {
    let tracked = OffsetTracker::new().track(stream);
    let encoder = LayerEncoder::new(docid);

    let mut artifacts = vec![
        encoder.encode_raw_text(&stream.raw_text()),
        text_header(docid, metadata),
    ];
    artifacts.extend(encoder.encode_layers(&tracked));
    artifacts
}

/// A source file that was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub path: String,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub parents_written: usize,
    pub parents_skipped: usize,
    pub children_written: usize,
    pub children_skipped: usize,
    /// Children written after a failed source; they are not checkpointed.
    pub children_unrecorded: usize,
    pub empty_divisions: usize,
    pub artifacts_written: usize,
    pub unmatched: Vec<String>,
    pub failed_sources: Vec<SkippedSource>,
    pub resumed_from: Option<CheckpointRecord>,
}

impl ConversionSummary {
    fn start() -> Self {
        let now = Utc::now();
        ConversionSummary {
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            parents_written: 0,
            parents_skipped: 0,
            children_written: 0,
            children_skipped: 0,
            children_unrecorded: 0,
            empty_divisions: 0,
            artifacts_written: 0,
            unmatched: Vec::new(),
            failed_sources: Vec::new(),
            resumed_from: None,
        }
    }

    fn finish(&mut self) {
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at).num_milliseconds();
    }
}

/// Checkpoint appends for one run.
///
/// The log must describe a gap-free prefix of the batch. Once a source has
/// been skipped, later children are still written but no longer recorded, so
/// a rerun resumes in front of the gap.
#[derive(Debug)]
struct Progress {
    log: CheckpointLog,
    gap: Option<String>,
}

impl Progress {
    fn record(&mut self, record: CheckpointRecord) -> Result<bool> {
        if self.gap.is_some() {
            return Ok(false);
        }
        self.log.append(&record)?;
        Ok(true)
    }

    fn mark_gap(&mut self, source: &Path) {
        if self.gap.is_none() {
            warn!(
                "Checkpoint frozen before {}; later children will be rewritten on the next run",
                source.display()
            );
            self.gap = Some(source.display().to_string());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Drives matching, conversion, output and checkpointing for a batch.
#[derive(Debug)]
pub struct BatchDriver<S: ArtifactSink> {
    config: ConvertConfig,
    sink: S,
    reader: SourceReader,
    parser: TokenStreamParser,
}

impl BatchDriver<FileSystemSink> {
    /// Create a driver writing below `config.output_dir`.
    pub fn from_config(config: ConvertConfig) -> Result<Self> {
        let sink = FileSystemSink::new(&config.output_dir);
        Self::new(config, sink)
    }
}

impl<S: ArtifactSink> BatchDriver<S> {
    pub fn new(config: ConvertConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let reader = SourceReader::new(&config.source_encoding)?;
        let parser = TokenStreamParser::new(config.no_space_marker.as_str());
        Ok(BatchDriver {
            config,
            sink,
            reader,
            parser,
        })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Build the parent plan for `inputs` against the metadata root.
    pub fn plan<I, P>(&self, inputs: I) -> Result<MatchPlan>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let index = MetadataIndex::scan(&self.config.metadata_root)?;
        info!(
            "Indexed {} metadata files under {}",
            index.len(),
            self.config.metadata_root.display()
        );
        let matcher = DocumentMatcher::new(index, self.config.annotation_prefix.as_str());
        Ok(matcher.plan(inputs))
    }

    /// Convert a batch of annotation-source files.
    pub fn run<I, P>(&mut self, inputs: I) -> Result<ConversionSummary>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let plan = self.plan(inputs)?;
        self.run_plan(&plan)
    }

    /// Convert an already matched batch.
    pub fn run_plan(&mut self, plan: &MatchPlan) -> Result<ConversionSummary> {
        let mut summary = ConversionSummary::start();
        summary.unmatched = plan
            .unmatched
            .iter()
            .map(|p| p.display().to_string())
            .collect();

        let (log, state) = CheckpointLog::open(&self.config.checkpoint_path, self.config.reset)?;
        if state == CheckpointState::Fresh && self.config.clean_output {
            info!("Removing previous output under {}", self.config.output_dir.display());
            self.sink
                .clear(&[log.path(), self.config.metadata_root.as_path()])?;
        }
        let mut progress = Progress { log, gap: None };
        summary.resumed_from = state.last_record().cloned();

        let mut parent_ids = IdentifierSequence::new(self.config.id_width);
        for (position, group) in plan.parents.iter().enumerate() {
            let parent = position + 1;
            let parent_id = parent_ids.advance()?.to_string();

            if state.skips_parent(parent) {
                debug!("Parent {parent_id} finished in an earlier run");
                summary.parents_skipped += 1;
                continue;
            }
            if let Some(record) = state.last_record().filter(|r| r.parent == parent) {
                let known = group
                    .fragments
                    .iter()
                    .any(|f| display_name(f) == record.source);
                if !known {
                    warn!(
                        "Checkpoint source {} is not part of parent {parent_id}; inputs may have changed",
                        record.source
                    );
                }
            }

            self.convert_parent(group, parent, &parent_id, &state, &mut progress, &mut summary)?;
            summary.parents_written += 1;
        }

        summary.finish();
        info!(
            "Converted {} children in {} parents ({} skipped from checkpoint, {} failed sources)",
            summary.children_written,
            summary.parents_written,
            summary.children_skipped,
            summary.failed_sources.len()
        );
        Ok(summary)
    }

    /// Record a file-local failure, or abort when running strictly.
    fn skip_or_fail(
        &self,
        path: &Path,
        error: StandoffError,
        summary: &mut ConversionSummary,
    ) -> Result<()> {
        if self.config.fail_fast || !error.is_file_local() {
            return Err(error);
        }
        warn!("Skipping {}: {error}", path.display());
        summary.failed_sources.push(SkippedSource {
            path: path.display().to_string(),
            reason: error.to_string(),
        });
        Ok(())
    }

    fn load_metadata(&self, path: &Path) -> Result<MetadataSource> {
        let text = self.reader.read(path)?;
        Ok(MetadataSource::parse_lenient(&text, &path.display().to_string()))
    }

    fn load_annotation(&self, path: &Path) -> Result<AnnotationSource> {
        let text = self.reader.read(path)?;
        AnnotationSource::parse(&text, self.parser.no_space_marker())
    }

    fn convert_parent(
        &mut self,
        group: &ParentGroup,
        parent: usize,
        parent_id: &str,
        state: &CheckpointState,
        progress: &mut Progress,
        summary: &mut ConversionSummary,
    ) -> Result<()> {
        let parent_dir = format!("{}{parent_id}", self.config.corpus_name);
        info!(
            "Parent {parent_dir}: {} fragment(s), metadata {}",
            group.fragments.len(),
            group.metadata.display()
        );

        let metadata = match self.load_metadata(&group.metadata) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Metadata for {parent_dir} unavailable; division headers left empty");
                self.skip_or_fail(&group.metadata, e, summary)?;
                MetadataSource::default()
            }
        };

        if !state.touches_parent(parent) {
            match &metadata.corpus_header {
                Some(block) => self.sink.write_parent_header(&parent_dir, &corpus_header(block))?,
                None => debug!("No corpus header in {}", group.metadata.display()),
            }
        }

        let mut child_ids = IdentifierSequence::new(self.config.id_width);
        let mut division_index = 0usize;

        for (position, fragment) in group.fragments.iter().enumerate() {
            let source = match self.load_annotation(fragment) {
                Ok(source) => source,
                Err(e) => {
                    self.skip_or_fail(fragment, e, summary)?;
                    progress.mark_gap(fragment);
                    // later fragments would be numbered against the wrong divisions
                    for rest in &group.fragments[position + 1..] {
                        warn!("Skipping {}: earlier fragment of {parent_dir} failed", rest.display());
                        summary.failed_sources.push(SkippedSource {
                            path: rest.display().to_string(),
                            reason: format!("earlier fragment {} failed", display_name(fragment)),
                        });
                    }
                    break;
                }
            };
            let source_name = display_name(fragment);
            info!(
                "Converting {source_name} (file={}, {} divisions)",
                source.file_attribute.as_deref().unwrap_or("-"),
                source.divisions.len()
            );

            for division in &source.divisions {
                let division_metadata = metadata.division(division_index);
                division_index += 1;

                let stream = self.parser.parse(division);
                if stream.is_empty() {
                    debug!("Empty division {division_index} in {source_name} skipped");
                    summary.empty_divisions += 1;
                    continue;
                }

                let child_id = child_ids.advance()?.to_string();
                let child = child_ids.index();
                if state.skips_child(parent, child) {
                    summary.children_skipped += 1;
                    continue;
                }

                let docid = format!("{parent_dir}.{child_id}");
                let artifacts = encode_division(&docid, &stream, &division_metadata);
                summary.artifacts_written += self.sink.write_child(&parent_dir, &child_id, &artifacts)?;
                let recorded =
                    progress.record(CheckpointRecord::new(source_name.as_str(), parent, child))?;
                if !recorded {
                    summary.children_unrecorded += 1;
                }
                summary.children_written += 1;
                debug!("Wrote {docid} ({} tokens)", stream.token_count());
            }
        }

        Ok(())
    }
}
