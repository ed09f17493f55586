//! Gesture Recognition
//!
//! Normalizer → Classifier → Trigger latch. All three are pure with respect to
//! the outside world: they never touch the store, the OS, or a clock of their
//! own.

pub mod normalize;
pub mod classifier;
pub mod trigger;

pub use normalize::normalize_landmarks;
pub use classifier::{Classifier, GestureTemplate, MatchResult};
pub use trigger::{TriggerEvent, TriggerPhase, TriggerStateMachine};
