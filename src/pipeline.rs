//! Batch conversion: matching, encoding, output and checkpointing.
//!
//! The [`driver::BatchDriver`] processes one parent at a time and hands every
//! finished child to an [`sink::ArtifactSink`]. The checkpoint log is appended
//! only after the sink has committed the child.

pub mod driver;
pub mod sink;

pub use driver::{BatchDriver, ConversionSummary, encode_division};
pub use sink::{ArtifactSink, FileSystemSink, MemorySink};
