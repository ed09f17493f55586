//! Actuation
//!
//! The host capabilities actions and pointer mode are expressed against:
//! key press/release, pointer buttons and motion, process launch, URL open,
//! clipboard write, and blocking pauses.
//!
//! Backends:
//! - [`EnigoActuator`]: real input through `enigo`, platform tools for the rest
//! - [`DryRunActuator`]: logs only
//! - [`RecordingActuator`]: in-memory call log with failure injection

pub mod actuator;
pub mod keys;
pub mod platform;
pub mod enigo_backend;
pub mod dry_run;
pub mod recording;

pub use actuator::{ActuationError, Actuator, PointerButton};
pub use keys::{parse_combo, paste_combo, KeyName};
pub use enigo_backend::EnigoActuator;
pub use dry_run::DryRunActuator;
pub use recording::{ActuationCall, ActuationLog, RecordingActuator};
