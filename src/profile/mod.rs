//! Profiles
//!
//! Action values, the persisted template/profile store, and context-scoped
//! resolution of fired gestures.

pub mod action;
pub mod store;
pub mod resolver;

pub use action::{ActionSpec, Chain, MouseButton, TOGGLE_FOLLOW};
pub use store::{DeleteOutcome, Profile, ProfileStore, Settings, GLOBAL, MAX_HOLD_TIME};
pub use resolver::{resolve, Resolution};
