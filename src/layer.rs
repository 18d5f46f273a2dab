//! Standoff layers: which layers exist, where their spans lie, and how they
//! are rendered.
//!
//! The offset walk runs once per division ([`tracker::OffsetTracker`]); every
//! layer is then rendered from the same spans by [`encoder::LayerEncoder`], so
//! token offsets are identical across all content layers by construction.

pub mod encoder;
pub mod kind;
pub mod tracker;
