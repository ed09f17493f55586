//! Hold-to-Confirm Trigger Latch
//!
//! Converts the per-frame classifier output into discrete fire events. A
//! gesture fires once its name has been reported continuously for the hold
//! time, and then not again until the classifier reports something else (or
//! nothing) and the gesture comes back.
//!
//! ```text
//!            name                 same name, elapsed ≥ hold
//!   Idle ───────────▶ Holding ─────────────────────────────▶ Fired
//!    ▲                  │  ▲ different name (timer restarts)   │
//!    │                  │  └───────────────────────────────────┤
//!    └──────────────────┴──── none / pointer dragging ─────────┘
//! ```
//!
//! Repeat suppression resets only on a transition through `Idle`. A perception
//! service that flickers between match and no-match on alternating frames can
//! therefore fire more than once during what the user perceives as one hold.

use crate::time::Timestamp;
use std::time::Duration;

/// Default hold time
pub const DEFAULT_HOLD_TIME: Duration = Duration::from_millis(500);

/// Observable latch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPhase {
    /// No candidate
    Idle,
    /// Candidate present, timer running
    Holding,
    /// Hold satisfied; already fired for this hold
    Fired,
}

/// Emitted exactly once per hold cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    /// Gesture that completed its hold
    pub gesture: String,
    /// How long it had been held when it fired
    pub held_for: Duration,
}

#[derive(Debug, Clone, Default)]
struct TriggerState {
    candidate: Option<String>,
    since: Timestamp,
    fired: bool,
}

/// Per-frame latch
#[derive(Debug, Clone)]
pub struct TriggerStateMachine {
    hold_time: Duration,
    state: TriggerState,
}

impl TriggerStateMachine {
    pub fn new(hold_time: Duration) -> Self {
        Self {
            hold_time,
            state: TriggerState::default(),
        }
    }

    pub fn hold_time(&self) -> Duration {
        self.hold_time
    }

    /// Change the hold time. The current hold, if any, is measured against
    /// the new value from the next frame on.
    pub fn set_hold_time(&mut self, hold_time: Duration) {
        self.hold_time = hold_time;
    }

    /// Evaluate one frame.
    ///
    /// `detected` is the classifier's accepted name for this frame. While the
    /// pointer is dragging, trigger evaluation is suspended and the latch is
    /// held in `Idle`.
    pub fn update(
        &mut self,
        detected: Option<&str>,
        dragging: bool,
        now: Timestamp,
    ) -> Option<TriggerEvent> {
        let name = match detected {
            Some(name) if !dragging => name,
            _ => {
                self.reset();
                return None;
            }
        };

        if self.state.candidate.as_deref() == Some(name) {
            let elapsed = now.duration_since(self.state.since);
            if elapsed >= self.hold_time && !self.state.fired {
                self.state.fired = true;
                return Some(TriggerEvent {
                    gesture: name.to_string(),
                    held_for: elapsed,
                });
            }
            None
        } else {
            self.state = TriggerState {
                candidate: Some(name.to_string()),
                since: now,
                fired: false,
            };
            None
        }
    }

    /// Drop any candidate and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = TriggerState::default();
    }

    pub fn phase(&self) -> TriggerPhase {
        match (&self.state.candidate, self.state.fired) {
            (None, _) => TriggerPhase::Idle,
            (Some(_), false) => TriggerPhase::Holding,
            (Some(_), true) => TriggerPhase::Fired,
        }
    }

    /// Current candidate name
    pub fn candidate(&self) -> Option<&str> {
        self.state.candidate.as_deref()
    }

    /// Hold progress in [0, 1] for the current candidate, for display.
    pub fn progress(&self, now: Timestamp) -> Option<f64> {
        self.state.candidate.as_ref()?;
        if self.hold_time.is_zero() {
            return Some(1.0);
        }
        let elapsed = now.duration_since(self.state.since).as_secs_f64();
        Some((elapsed / self.hold_time.as_secs_f64()).min(1.0))
    }
}

impl Default for TriggerStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_TIME)
    }
}
