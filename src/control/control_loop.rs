//! Frame Loop
//!
//! One pass per perception frame, on one thread:
//!
//! 1. apply queued [`LoopCommand`]s (authoring, pause, follow toggle)
//! 2. skip everything while paused
//! 3. normalize and classify the hand, update the pointer
//! 4. evaluate the trigger latch
//! 5. on fire, resolve against the active context and dispatch
//!
//! The toggle-follow special is intercepted before the executor. While
//! follow is enabled every other action is suppressed.

use super::commands::{ControlHandle, LoopCommand};
use super::overlay::{OverlayStatus, StatusOverlay};
use crate::actuation::Actuator;
use crate::app::config::Config;
use crate::context::ContextProvider;
use crate::execution::{ActionExecutor, ExecutionLimits, ExecutionReport};
use crate::perception::{FrameSource, LandmarkFrame, Point2};
use crate::pointer::{PointerController, PointerSettings, PointerUpdate};
use crate::profile::{ProfileStore, Resolution};
use crate::recognition::{
    normalize_landmarks, Classifier, GestureTemplate, TriggerEvent, TriggerStateMachine,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Screen size used when neither configuration nor the backend supplies one
pub const FALLBACK_SCREEN: (u32, u32) = (1920, 1080);

/// Poll interval while paused
const PAUSED_POLL: Duration = Duration::from_millis(20);

/// What happened to a fired gesture
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Executed {
        action: String,
        report: ExecutionReport,
    },
    /// Follow mode flipped; carries the new state
    ToggledFollow(bool),
    /// Mapped, but follow mode is on
    Suppressed,
    /// Nothing mapped in the active context or `GLOBAL`
    Unmapped,
}

/// Per-frame result, mostly for diagnostics and tests
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutcome {
    /// Frame was skipped because the loop is paused
    pub paused: bool,
    /// Classifier's accepted gesture
    pub detected: Option<String>,
    /// Smallest template distance this frame
    pub distance: Option<f64>,
    pub pointer: PointerUpdate,
    pub fired: Option<TriggerEvent>,
    pub dispatch: Option<Dispatch>,
}

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    pub frames: u64,
    pub hand_frames: u64,
    pub fires: u64,
    pub executed: u64,
    pub suppressed: u64,
    pub unmapped: u64,
}

/// The single-threaded gesture control loop
pub struct ControlLoop {
    config: Config,
    store: ProfileStore,
    classifier: Classifier,
    trigger: TriggerStateMachine,
    executor: ActionExecutor,
    pointer: PointerController,
    actuator: Box<dyn Actuator>,
    context: Box<dyn ContextProvider>,
    commands: Receiver<LoopCommand>,
    command_tx: Sender<LoopCommand>,
    stop: Arc<AtomicBool>,
    paused: bool,
    last_hand: Option<Vec<Point2>>,
    overlay: Option<StatusOverlay>,
    stats: LoopStats,
}

impl ControlLoop {
    pub fn new(
        config: &Config,
        store: ProfileStore,
        actuator: Box<dyn Actuator>,
        context: Box<dyn ContextProvider>,
    ) -> Self {
        let screen = config.pointer.screen_override().unwrap_or_else(|| {
            actuator.screen_size().unwrap_or_else(|e| {
                warn!(error = %e, "Could not read screen size, assuming {}x{}", FALLBACK_SCREEN.0, FALLBACK_SCREEN.1);
                FALLBACK_SCREEN
            })
        });
        info!(width = screen.0, height = screen.1, "Screen size");

        let settings = store.settings().clone();
        let (command_tx, commands) = mpsc::channel();

        Self {
            classifier: Classifier::with_threshold(settings.threshold),
            trigger: TriggerStateMachine::new(settings.hold_duration()),
            executor: ActionExecutor::new(ExecutionLimits::from(&config.executor)),
            pointer: PointerController::new(PointerSettings::from_config(config, &settings), screen),
            config: config.clone(),
            store,
            actuator,
            context,
            commands,
            command_tx,
            stop: Arc::new(AtomicBool::new(false)),
            paused: false,
            last_hand: None,
            overlay: None,
            stats: LoopStats::default(),
        }
    }

    /// Show the terminal status line while running.
    pub fn with_preview(mut self, enabled: bool) -> Self {
        self.overlay = enabled.then(StatusOverlay::new);
        self
    }

    /// Handle for queueing commands and stopping the loop from other threads
    pub fn handle(&self) -> ControlHandle {
        ControlHandle::new(self.command_tx.clone(), self.stop.clone())
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn into_store(self) -> ProfileStore {
        self.store
    }

    pub fn pointer(&self) -> &PointerController {
        &self.pointer
    }

    pub fn trigger(&self) -> &TriggerStateMachine {
        &self.trigger
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Run until the source ends, a quit command arrives, or the stop flag is
    /// set. Only a failing source is an error.
    pub fn run<S: FrameSource>(&mut self, mut source: S) -> crate::Result<LoopStats> {
        info!(
            templates = self.store.templates().len(),
            hold_ms = self.trigger.hold_time().as_millis() as u64,
            threshold = self.classifier.threshold,
            "Control loop started"
        );

        let result = loop {
            self.drain_commands();
            if self.stop.load(Ordering::SeqCst) {
                info!("Stop requested");
                break Ok(());
            }

            if self.paused {
                self.render_overlay(None);
                std::thread::sleep(PAUSED_POLL);
                continue;
            }

            match source.next_frame() {
                Ok(Some(frame)) => {
                    self.process_frame(&frame);
                }
                Ok(None) => {
                    info!("Perception stream ended");
                    break Ok(());
                }
                Err(e) => break Err(e),
            }
        };

        self.shutdown();
        result.map(|_| self.stats)
    }

    /// Process one frame. Queued commands are not applied here; call
    /// [`ControlLoop::drain_commands`] between frames.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        if self.paused {
            outcome.paused = true;
            return outcome;
        }
        self.stats.frames += 1;

        let landmark_count = self.config.perception.landmark_count;
        match frame.hand(landmark_count) {
            Some(points) => {
                self.stats.hand_frames += 1;
                let normalized = normalize_landmarks(points);
                let result = self.classifier.classify(&normalized, self.store.templates());
                outcome.detected = result.name;
                outcome.distance = result.distance.is_finite().then_some(result.distance);

                outcome.pointer = self.pointer.update(points, self.actuator.as_mut());
                self.last_hand = Some(points.to_vec());
            }
            None => {
                self.pointer.hand_lost();
                self.last_hand = None;
            }
        }

        outcome.fired = self.trigger.update(
            outcome.detected.as_deref(),
            self.pointer.is_dragging(),
            frame.timestamp,
        );

        if let Some(event) = &outcome.fired {
            self.stats.fires += 1;
            outcome.dispatch = Some(self.dispatch(event));
        }

        self.render_overlay(Some(frame));
        outcome
    }

    fn dispatch(&mut self, event: &TriggerEvent) -> Dispatch {
        let context = self.context.active_context();
        let dispatch = match self.store.resolve(&event.gesture, &context) {
            Resolution::NoAction => {
                self.stats.unmapped += 1;
                Dispatch::Unmapped
            }
            Resolution::Action(action) if action.is_toggle_follow() => {
                Dispatch::ToggledFollow(self.pointer.toggle_follow(self.actuator.as_mut()))
            }
            Resolution::Action(_) if self.pointer.is_following() => {
                self.stats.suppressed += 1;
                Dispatch::Suppressed
            }
            Resolution::Action(action) => {
                self.stats.executed += 1;
                let report = self.executor.execute(action, self.actuator.as_mut());
                Dispatch::Executed {
                    action: action.to_string(),
                    report,
                }
            }
        };
        info!(
            gesture = %event.gesture,
            context = %context,
            held_ms = event.held_for.as_millis() as u64,
            ?dispatch,
            "Gesture fired"
        );
        dispatch
    }

    /// Apply every queued command.
    pub fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.apply_command(command);
        }
    }

    /// Apply one command immediately.
    pub fn apply_command(&mut self, command: LoopCommand) {
        debug!(?command, "Applying command");
        match command {
            LoopCommand::SaveGesture { name, scope, action } => {
                let Some(hand) = &self.last_hand else {
                    warn!(gesture = %name, "No hand in view, nothing to save");
                    return;
                };
                let template = GestureTemplate::capture(name.clone(), hand);
                if let Err(e) = self.store.register_gesture(template) {
                    warn!(gesture = %name, error = %e, "Could not register gesture");
                    return;
                }
                if let Some(action) = action {
                    if let Err(e) = self.store.set_action(&scope, &name, action) {
                        warn!(gesture = %name, error = %e, "Could not map gesture");
                    }
                }
                self.trigger.reset();
                self.persist();
            }
            LoopCommand::DeleteGesture { name, scope } => {
                self.store.delete_gesture(&name, &scope);
                self.trigger.reset();
                self.persist();
            }
            LoopCommand::SetSetting { key, value } => {
                let mut candidate = self.store.settings().clone();
                let checked = candidate
                    .set(&key, &value)
                    .and_then(|_| PointerSettings::check(&self.config, &candidate))
                    .and_then(|_| self.store.save_setting(&key, &value));
                if let Err(e) = checked {
                    warn!(error = %e, "Setting rejected");
                    return;
                }
                self.apply_settings();
                self.persist();
            }
            LoopCommand::Pause => {
                if !self.paused {
                    info!("Paused");
                    self.paused = true;
                    self.trigger.reset();
                }
            }
            LoopCommand::Resume => {
                if self.paused {
                    info!("Resumed");
                    self.paused = false;
                }
            }
            LoopCommand::ToggleFollow => {
                self.pointer.toggle_follow(self.actuator.as_mut());
            }
            LoopCommand::Quit => {
                self.stop.store(true, Ordering::SeqCst);
            }
        }
    }

    fn apply_settings(&mut self) {
        let settings = self.store.settings().clone();
        self.classifier.threshold = settings.threshold;
        self.trigger.set_hold_time(settings.hold_duration());
        self.pointer
            .apply_settings(PointerSettings::from_config(&self.config, &settings));
        debug!(?settings, "Settings applied");
    }

    fn persist(&self) {
        if self.store.path().is_none() {
            return;
        }
        if let Err(e) = self.store.save() {
            warn!(error = %e, "Could not save profile store");
        }
    }

    fn render_overlay(&mut self, frame: Option<&LandmarkFrame>) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        let now = frame.map(|f| f.timestamp);
        let holding = match (self.trigger.candidate(), now) {
            (Some(name), Some(now)) => self.trigger.progress(now).map(|p| (name, p)),
            _ => None,
        };
        overlay.render(&OverlayStatus {
            paused: self.paused,
            holding,
            pointer: self
                .pointer
                .is_following()
                .then(|| self.pointer.is_dragging()),
        });
    }

    fn shutdown(&mut self) {
        self.pointer.release(self.actuator.as_mut());
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.finish();
        }
        info!(
            frames = self.stats.frames,
            fires = self.stats.fires,
            executed = self.stats.executed,
            "Control loop stopped"
        );
    }
}
