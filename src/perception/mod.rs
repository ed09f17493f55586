//! Perception input
//!
//! The pose estimator itself lives outside this crate. This module defines the
//! frame it hands us and the sources that read those frames, either from a
//! spawned estimator process or from any line-oriented JSON stream.

pub mod types;
pub mod source;

pub use types::*;
pub use source::{parse_frame_line, FrameSource, JsonLinesSource, SidecarSource};
