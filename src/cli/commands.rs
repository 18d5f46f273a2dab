//! Command implementations for the standoff CLI.

use anyhow::{Context, Result};

use crate::checkpoint::{CheckpointState, read_state};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ConvertConfig;
use crate::matcher::{DocumentMatcher, MetadataIndex, expand_inputs};
use crate::pipeline::driver::BatchDriver;

/// Execute a CLI command.
pub fn execute_command(args: StandoffArgs) -> Result<()> {
    match &args.command {
        Command::Convert(convert_args) => convert(convert_args, &args),
        Command::Match(match_args) => match_inputs(match_args, &args),
        Command::Status(status_args) => show_status(status_args, &args),
    }
}

/// Merge the optional config file with command line flags.
fn build_config(args: &ConvertArgs) -> Result<ConvertConfig> {
    let mut config = match &args.config {
        Some(path) => ConvertConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConvertConfig::default(),
    };

    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(metadata) = &args.metadata {
        config.metadata_root = metadata.clone();
    }
    if let Some(checkpoint) = &args.checkpoint {
        config.checkpoint_path = checkpoint.clone();
    }
    if let Some(corpus_name) = &args.corpus_name {
        config.corpus_name = corpus_name.clone();
    }
    if let Some(encoding) = &args.encoding {
        config.source_encoding = encoding.clone();
    }
    config.reset |= args.reset;
    config.clean_output |= args.clean_output;
    config.fail_fast |= args.strict;

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Run a conversion batch.
fn convert(args: &ConvertArgs, cli_args: &StandoffArgs) -> Result<()> {
    let config = build_config(args)?;
    let output_dir = config.output_dir.clone();
    let inputs = expand_inputs(&args.inputs).context("expanding input patterns")?;

    let mut driver = BatchDriver::from_config(config)?;
    let summary = driver
        .run(&inputs)
        .with_context(|| format!("converting into {}", output_dir.display()))?;

    output_result("Conversion finished", &summary, cli_args)?;
    Ok(())
}

/// Show how inputs would be grouped without converting anything.
fn match_inputs(args: &MatchArgs, cli_args: &StandoffArgs) -> Result<()> {
    let index = MetadataIndex::scan(&args.metadata)
        .with_context(|| format!("scanning metadata under {}", args.metadata.display()))?;
    let metadata_files = index.len();
    let inputs = expand_inputs(&args.inputs).context("expanding input patterns")?;
    let plan = DocumentMatcher::new(index, args.prefix.as_str()).plan(&inputs);

    let report = MatchReport {
        metadata_files,
        parents: plan
            .parents
            .iter()
            .enumerate()
            .map(|(i, group)| MatchedParent {
                parent: i + 1,
                metadata: group.metadata.display().to_string(),
                fragments: group
                    .fragments
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect(),
            })
            .collect(),
        unmatched: plan
            .unmatched
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    };

    output_result("Match plan", &report, cli_args)?;
    Ok(())
}

/// Print the recorded resume position.
fn show_status(args: &StatusArgs, cli_args: &StandoffArgs) -> Result<()> {
    let state = read_state(&args.checkpoint)
        .with_context(|| format!("reading checkpoint {}", args.checkpoint.display()))?;

    let record = state.last_record();
    let report = StatusReport {
        checkpoint: args.checkpoint.display().to_string(),
        fresh: state == CheckpointState::Fresh,
        source: record.map(|r| r.source.clone()),
        parent: record.map(|r| r.parent),
        child: record.map(|r| r.child),
    };

    output_result("Checkpoint status", &report, cli_args)?;
    Ok(())
}
