//! Pointer Control Mode
//!
//! While follow is enabled the index fingertip steers the cursor, and a
//! second hand feature drives the left button:
//!
//! | mode     | motion                                              | drag engaged when                  |
//! |----------|-----------------------------------------------------|------------------------------------|
//! | absolute | fingertip mapped from an inset capture rectangle,   | thumb tip above index knuckle by   |
//! |          | smoothed, clamped to the screen                     | more than `drag_margin`            |
//! | relative | frame-to-frame fingertip delta × sensitivity        | thumb tip to index tip distance    |
//! |          |                                                     | below `pinch_threshold`            |
//!
//! Button events are edge-triggered: one press when drag engages, one release
//! when it disengages.

use super::smoothing::ExponentialSmoother;
use crate::actuation::{Actuator, PointerButton};
use crate::app::config::Config;
use crate::perception::{Point2, INDEX_MCP, INDEX_TIP, THUMB_TIP};
use crate::profile::Settings;
use tracing::{debug, info, warn};

/// How fingertip motion maps to cursor motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    Absolute,
    /// Trackpad-style relative motion
    Relative,
}

/// Tunables for pointer mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSettings {
    pub mode: PointerMode,
    /// Camera frame size in pixels
    pub frame_size: (u32, u32),
    /// Capture rectangle inset in frame pixels, each side
    pub frame_reduction: f64,
    /// Relative-mode gain
    pub sensitivity: f64,
    /// Absolute-mode smoothing factor
    pub smoothing: f64,
    /// Normalized y margin for the thumb-up drag test
    pub drag_margin: f64,
    /// Normalized pinch distance for the relative drag test
    pub pinch_threshold: f64,
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            mode: PointerMode::Absolute,
            frame_size: (640, 480),
            frame_reduction: 100.0,
            sensitivity: 3.0,
            smoothing: 0.2,
            drag_margin: 0.02,
            pinch_threshold: 0.05,
        }
    }
}

impl PointerSettings {
    /// Combine static configuration with the store's live settings.
    ///
    /// A `frame_reduction` that leaves no capture rectangle is logged and
    /// replaced by zero (the full frame).
    pub fn from_config(config: &Config, settings: &Settings) -> Self {
        let frame_size = (config.perception.frame_width, config.perception.frame_height);
        let frame_reduction = if settings.frame_reduction > Self::max_frame_reduction(frame_size) {
            warn!(
                frame_reduction = settings.frame_reduction,
                max = Self::max_frame_reduction(frame_size),
                "frame_reduction leaves no capture area, using the full frame"
            );
            0
        } else {
            settings.frame_reduction
        };
        Self {
            mode: if settings.trackpad_mode {
                PointerMode::Relative
            } else {
                PointerMode::Absolute
            },
            frame_size,
            frame_reduction: f64::from(frame_reduction),
            sensitivity: settings.trackpad_sensitivity,
            smoothing: config.pointer.smoothing,
            drag_margin: config.pointer.drag_margin,
            pinch_threshold: config.pointer.pinch_threshold,
        }
    }

    /// Largest inset that still leaves a capture rectangle inside `frame_size`
    pub fn max_frame_reduction(frame_size: (u32, u32)) -> u32 {
        (frame_size.0.min(frame_size.1) / 2).saturating_sub(1)
    }

    /// Reject settings pointer mode cannot use with this configuration.
    pub fn check(config: &Config, settings: &Settings) -> crate::Result<()> {
        let frame_size = (config.perception.frame_width, config.perception.frame_height);
        let max = Self::max_frame_reduction(frame_size);
        if settings.frame_reduction > max {
            return Err(crate::Error::Profile(format!(
                "frame_reduction = {}: must be at most {} for a {}x{} frame",
                settings.frame_reduction, max, frame_size.0, frame_size.1
            )));
        }
        Ok(())
    }
}

/// Follow/drag state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub follow_enabled: bool,
    pub dragging: bool,
    /// Relative-mode reference point
    pub last_tracked: Option<Point2>,
}

/// Button edge produced by one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTransition {
    Engaged,
    Released,
}

/// What one update did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerUpdate {
    /// Absolute cursor target, if the cursor was moved to one
    pub position: Option<(i32, i32)>,
    /// Relative move issued, if any
    pub delta: Option<(i32, i32)>,
    pub transition: Option<DragTransition>,
}

/// Linear map of `value` from `[in_lo, in_hi]` to `[out_lo, out_hi]`,
/// clamped to the input range.
pub fn interpolate(value: f64, (in_lo, in_hi): (f64, f64), (out_lo, out_hi): (f64, f64)) -> f64 {
    if in_hi <= in_lo {
        return (out_lo + out_hi) / 2.0;
    }
    let t = ((value - in_lo) / (in_hi - in_lo)).clamp(0.0, 1.0);
    out_lo + t * (out_hi - out_lo)
}

/// Drives the cursor from hand landmarks
#[derive(Debug, Clone)]
pub struct PointerController {
    settings: PointerSettings,
    screen: (u32, u32),
    state: PointerState,
    smoother: ExponentialSmoother,
}

impl PointerController {
    pub fn new(settings: PointerSettings, screen: (u32, u32)) -> Self {
        let center = screen_center(screen);
        Self {
            smoother: ExponentialSmoother::new(settings.smoothing, center),
            settings,
            screen,
            state: PointerState::default(),
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn settings(&self) -> &PointerSettings {
        &self.settings
    }

    pub fn is_following(&self) -> bool {
        self.state.follow_enabled
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Replace tunables. Switching mode drops the relative reference.
    pub fn apply_settings(&mut self, settings: PointerSettings) {
        if settings.mode != self.settings.mode {
            self.state.last_tracked = None;
        }
        self.smoother = ExponentialSmoother::new(settings.smoothing, self.smoother.value());
        self.settings = settings;
    }

    /// Flip follow mode. Returns the new state.
    pub fn toggle_follow(&mut self, actuator: &mut dyn Actuator) -> bool {
        let enabled = !self.state.follow_enabled;
        self.set_follow(enabled, actuator);
        enabled
    }

    /// Enable or disable follow. Disabling releases an active drag; either way
    /// the smoother recenters and the relative reference is cleared.
    pub fn set_follow(&mut self, enabled: bool, actuator: &mut dyn Actuator) {
        self.state.follow_enabled = enabled;
        if !enabled {
            self.release(actuator);
        }
        self.smoother.recenter(screen_center(self.screen));
        self.state.last_tracked = None;
        info!(follow = enabled, "Pointer follow toggled");
    }

    /// Release the button if a drag is active.
    pub fn release(&mut self, actuator: &mut dyn Actuator) -> Option<DragTransition> {
        if !self.state.dragging {
            return None;
        }
        self.state.dragging = false;
        if let Err(e) = actuator.button_up(PointerButton::Left) {
            warn!(error = %e, "Drag release failed");
        }
        Some(DragTransition::Released)
    }

    /// The hand left the frame. Drag state is kept; the relative reference is
    /// dropped so the cursor does not jump when the hand returns.
    pub fn hand_lost(&mut self) {
        self.state.last_tracked = None;
    }

    /// Process one frame of landmarks.
    pub fn update(&mut self, hand: &[Point2], actuator: &mut dyn Actuator) -> PointerUpdate {
        let mut update = PointerUpdate::default();
        if !self.state.follow_enabled {
            return update;
        }
        if hand.len() <= INDEX_TIP {
            debug!(points = hand.len(), "Too few landmarks for pointer control");
            return update;
        }

        let tip = hand[INDEX_TIP];
        let want_drag = match self.settings.mode {
            PointerMode::Absolute => {
                let target = self.map_absolute(tip);
                let (x, y) = self.smoother.update(target);
                let (max_x, max_y) = (
                    f64::from(self.screen.0.saturating_sub(1)),
                    f64::from(self.screen.1.saturating_sub(1)),
                );
                let pos = (x.clamp(0.0, max_x).round() as i32, y.clamp(0.0, max_y).round() as i32);
                if let Err(e) = actuator.move_to(pos.0, pos.1) {
                    warn!(error = %e, "Cursor move failed");
                }
                update.position = Some(pos);
                (hand[INDEX_MCP].y - hand[THUMB_TIP].y) > self.settings.drag_margin
            }
            PointerMode::Relative => {
                if let Some(last) = self.state.last_tracked {
                    let (fw, fh) = self.settings.frame_size;
                    let dx = ((tip.x - last.x) * self.settings.sensitivity * f64::from(fw)).round() as i32;
                    let dy = ((tip.y - last.y) * self.settings.sensitivity * f64::from(fh)).round() as i32;
                    if dx != 0 || dy != 0 {
                        if let Err(e) = actuator.move_by(dx, dy) {
                            warn!(error = %e, "Cursor move failed");
                        }
                        update.delta = Some((dx, dy));
                    }
                }
                self.state.last_tracked = Some(tip);
                hand[THUMB_TIP].distance_to(&tip) < self.settings.pinch_threshold
            }
        };

        update.transition = self.set_dragging(want_drag, actuator);
        update
    }

    fn map_absolute(&self, tip: Point2) -> (f64, f64) {
        let (fw, fh) = (f64::from(self.settings.frame_size.0), f64::from(self.settings.frame_size.1));
        let r = self.settings.frame_reduction;
        let (sw, sh) = (f64::from(self.screen.0), f64::from(self.screen.1));
        (
            interpolate(tip.x * fw, (r, fw - r), (0.0, sw)),
            interpolate(tip.y * fh, (r, fh - r), (0.0, sh)),
        )
    }

    fn set_dragging(&mut self, want: bool, actuator: &mut dyn Actuator) -> Option<DragTransition> {
        match (want, self.state.dragging) {
            (true, false) => {
                self.state.dragging = true;
                if let Err(e) = actuator.button_down(PointerButton::Left) {
                    warn!(error = %e, "Drag press failed");
                }
                debug!("Drag engaged");
                Some(DragTransition::Engaged)
            }
            (false, true) => {
                debug!("Drag released");
                self.release(actuator)
            }
            _ => None,
        }
    }
}

fn screen_center(screen: (u32, u32)) -> (f64, f64) {
    (f64::from(screen.0) / 2.0, f64::from(screen.1) / 2.0)
}
