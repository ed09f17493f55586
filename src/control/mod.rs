//! Control Loop
//!
//! The single-threaded orchestrator that runs recognition, pointer control,
//! and action dispatch once per perception frame, plus the command channel
//! through which authoring requests reach it.

pub mod commands;
pub mod control_loop;
pub mod overlay;

pub use commands::{parse_command, spawn_command_reader, ControlHandle, LoopCommand};
pub use control_loop::{ControlLoop, Dispatch, FrameOutcome, LoopStats};
pub use overlay::StatusOverlay;
