//! Pointer Control
//!
//! Continuous cursor control from hand tracking, mutually exclusive with
//! discrete gesture actions while follow is enabled.

pub mod smoothing;
pub mod mode;

pub use smoothing::ExponentialSmoother;
pub use mode::{
    interpolate, DragTransition, PointerController, PointerMode, PointerSettings, PointerState,
    PointerUpdate,
};
