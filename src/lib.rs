//! # Gesture Control
//!
//! Turns a stream of hand-pose observations into debounced gesture events and
//! maps them, per focused application, onto desktop automation actions.
//!
//! ## Overview
//!
//! An external pose estimator delivers one frame of 21 normalized hand
//! landmarks per camera frame. Each frame is normalized into a translation and
//! scale invariant shape, matched against registered gesture templates, and
//! fed to a hold-to-confirm latch. When a hold completes, the gesture is
//! resolved against the active application's profile (falling back to
//! `GLOBAL`) and the resulting action is executed. A pointer mode can take over
//! instead, steering the cursor with the index fingertip.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gesture_control::actuation::DryRunActuator;
//! use gesture_control::app::config::Config;
//! use gesture_control::context::StaticContext;
//! use gesture_control::control::ControlLoop;
//! use gesture_control::perception::JsonLinesSource;
//! use gesture_control::profile::ProfileStore;
//!
//! let config = Config::default();
//! let store = ProfileStore::load_or_default(&config.store.profiles_path());
//! let source = JsonLinesSource::new(std::io::stdin().lock());
//!
//! let mut control = ControlLoop::new(
//!     &config,
//!     store,
//!     Box::new(DryRunActuator::new((1920, 1080))),
//!     Box::new(StaticContext::global()),
//! );
//! control.run(source).expect("perception stream failed");
//! ```
//!
//! ## Architecture
//!
//! - [`perception`]: landmark frames and frame sources (sidecar process, JSON lines)
//! - [`recognition`]: normalizer, nearest-template classifier, trigger latch
//! - [`profile`]: action values, the profile/template store, context resolution
//! - [`execution`]: the best-effort action chain executor
//! - [`actuation`]: keyboard, pointer, launch, and clipboard capabilities
//! - [`pointer`]: absolute and trackpad cursor control with drag detection
//! - [`context`]: active application context providers
//! - [`control`]: the single-threaded frame loop and its command channel
//! - [`time`]: monotonic timestamps
//! - [`app`]: CLI and configuration management
//!
//! ## Frame Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Perception │───▶│ Normalizer  │───▶│ Classifier  │───▶│   Trigger   │
//! │   (frame)   │    │             │    │             │    │    latch    │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                           ┌─────────────────────────────────────┤
//!                           ▼                                     ▼
//!                    ┌─────────────┐                       ┌─────────────┐
//!                    │   Pointer   │                       │  Resolver   │──▶ Executor
//!                    │    mode     │                       │  (profile)  │
//!                    └─────────────┘                       └─────────────┘
//! ```

pub mod time;
pub mod perception;
pub mod recognition;
pub mod profile;
pub mod actuation;
pub mod execution;
pub mod pointer;
pub mod context;
pub mod control;
pub mod app;

// Re-export commonly used types
pub use perception::{LandmarkFrame, Point2};
pub use profile::{ActionSpec, ProfileStore, Resolution};
pub use recognition::{Classifier, MatchResult, TriggerStateMachine};
pub use control::ControlLoop;

/// Result type alias for the gesture engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gesture engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Perception error: {0}")]
    Perception(String),

    #[error("Actuation error: {0}")]
    Actuation(#[from] actuation::ActuationError),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("Invalid action '{input}': {reason}")]
    InvalidAction { input: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
