//! Command line argument parsing for the standoff converter using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// standoff - convert annotated corpus documents into standoff layers
#[derive(Parser, Debug, Clone)]
#[command(name = "standoff")]
#[command(about = "Convert token-annotated corpus XML into per-document standoff XML layers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct StandoffArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl StandoffArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert annotation sources into the output tree
    Convert(ConvertArgs),

    /// Show how inputs pair with metadata files, without converting
    Match(MatchArgs),

    /// Show the resume position recorded in a checkpoint log
    Status(StatusArgs),
}

/// Arguments for a conversion run
#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    /// Annotation-source files or glob patterns, in processing order
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Root of the output tree
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Directory searched recursively for metadata sources
    #[arg(short, long, value_name = "META_ROOT")]
    pub metadata: Option<PathBuf>,

    /// Checkpoint log path
    #[arg(short, long, value_name = "CHECKPOINT")]
    pub checkpoint: Option<PathBuf>,

    /// JSON configuration file; command line flags take precedence
    #[arg(long, value_name = "CONFIG_FILE", env = "STANDOFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ignore the checkpoint and start over
    #[arg(long)]
    pub reset: bool,

    /// With a fresh start, remove existing output first
    #[arg(long)]
    pub clean_output: bool,

    /// Abort on the first unreadable source instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Prefix of parent directory names
    #[arg(long)]
    pub corpus_name: Option<String>,

    /// Character encoding of the sources
    #[arg(long)]
    pub encoding: Option<String>,
}

/// Arguments for a dry-run match
#[derive(Parser, Debug, Clone)]
pub struct MatchArgs {
    /// Annotation-source files or glob patterns, in processing order
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory searched recursively for metadata sources
    #[arg(short, long, value_name = "META_ROOT")]
    pub metadata: PathBuf,

    /// Prefix stripped from annotation-source names before matching
    #[arg(long, default_value = "noske_")]
    pub prefix: String,
}

/// Arguments for inspecting a checkpoint
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    /// Checkpoint log path
    #[arg(value_name = "CHECKPOINT")]
    pub checkpoint: PathBuf,
}

/// Output formats supported by the CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
