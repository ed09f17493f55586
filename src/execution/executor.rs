//! Action Chain Executor
//!
//! Interprets an [`ActionSpec`] against an [`Actuator`]. Execution is
//! synchronous and best-effort: a failing step is logged and the remaining
//! steps still run. Nothing is rolled back and nothing is raised to the
//! caller; the returned [`ExecutionReport`] says what happened.

use crate::actuation::{parse_combo, paste_combo, platform, Actuator, KeyName, PointerButton};
use crate::app::config::ExecutorConfig;
use crate::profile::{ActionSpec, MouseButton};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing limits applied while executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Upper bound for a single `Wait` step
    pub max_wait: Duration,
    /// Delay before a hotkey combo is pressed
    pub key_settle: Duration,
    /// Delay between writing the clipboard and pasting
    pub clipboard_settle: Duration,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_millis(5_000),
            key_settle: Duration::from_millis(100),
            clipboard_settle: Duration::from_millis(100),
        }
    }
}

impl From<&ExecutorConfig> for ExecutionLimits {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            max_wait: Duration::from_millis(config.max_wait_ms),
            key_settle: Duration::from_millis(config.key_settle_ms),
            clipboard_settle: Duration::from_millis(config.clipboard_settle_ms),
        }
    }
}

/// Summary of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionReport {
    /// Steps started (a chain counts each step; a plain action counts one)
    pub attempted: usize,
    /// Steps that hit at least one actuation failure
    pub failed: usize,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Runs actions against an actuator
#[derive(Debug, Clone, Default)]
pub struct ActionExecutor {
    limits: ExecutionLimits,
}

impl ActionExecutor {
    pub fn new(limits: ExecutionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// Execute an action. Never fails; see the report.
    pub fn execute(&self, action: &ActionSpec, actuator: &mut dyn Actuator) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        match action {
            ActionSpec::Chain(chain) => {
                debug!(steps = chain.len(), "Running chain");
                for (index, step) in chain.steps().iter().enumerate() {
                    report.attempted += 1;
                    if !self.run_step(step, actuator) {
                        warn!(step = index, action = %step, "Chain step failed, continuing");
                        report.failed += 1;
                    }
                }
            }
            single => {
                report.attempted = 1;
                if !self.run_step(single, actuator) {
                    report.failed = 1;
                }
            }
        }

        info!(
            action = action.kind(),
            attempted = report.attempted,
            failed = report.failed,
            "Executed action"
        );
        report
    }

    /// Run a single non-chain step. Returns false if anything failed.
    fn run_step(&self, step: &ActionSpec, actuator: &mut dyn Actuator) -> bool {
        match step {
            ActionSpec::Hotkey(combo) => self.press_combo(combo, actuator),
            ActionSpec::Launch(command) => {
                check(actuator.launch(command), "launch", command)
            }
            ActionSpec::OpenWeb(url) => {
                let url = platform::normalize_url(url);
                check(actuator.open_url(&url), "open url", &url)
            }
            ActionSpec::TypeText(text) | ActionSpec::PasteText(text) => self.paste_text(text, actuator),
            ActionSpec::MouseClick(button) => {
                let (button, times) = match button {
                    MouseButton::Left => (PointerButton::Left, 1),
                    MouseButton::Right => (PointerButton::Right, 1),
                    MouseButton::Middle => (PointerButton::Middle, 1),
                    MouseButton::Double => (PointerButton::Left, 2),
                };
                let mut ok = true;
                for _ in 0..times {
                    ok &= check(actuator.click(button), "click", button_name(button));
                }
                ok
            }
            ActionSpec::Wait(ms) => {
                let requested = Duration::from_millis(*ms);
                let wait = if requested > self.limits.max_wait {
                    warn!(
                        requested_ms = *ms,
                        max_ms = self.limits.max_wait.as_millis() as u64,
                        "Wait exceeds limit, clamping"
                    );
                    self.limits.max_wait
                } else {
                    requested
                };
                actuator.pause(wait);
                true
            }
            ActionSpec::Special(name) => {
                debug!(special = %name, "Special command has no executor behaviour");
                true
            }
            ActionSpec::Chain(_) => {
                warn!("Nested chain ignored");
                false
            }
        }
    }

    /// Press keys in order, release in reverse.
    fn press_combo(&self, combo: &str, actuator: &mut dyn Actuator) -> bool {
        let (keys, unknown) = parse_combo(combo);
        for name in &unknown {
            warn!(key = %name, combo = %combo, "Unknown key name skipped");
        }
        if keys.is_empty() {
            warn!(combo = %combo, "Hotkey has no usable keys");
            return false;
        }

        actuator.pause(self.limits.key_settle);
        press_and_release(&keys, actuator)
    }

    fn paste_text(&self, text: &str, actuator: &mut dyn Actuator) -> bool {
        if !check(actuator.set_clipboard(text), "set clipboard", "") {
            return false;
        }
        actuator.pause(self.limits.clipboard_settle);
        press_and_release(&paste_combo(), actuator)
    }
}

fn press_and_release(keys: &[KeyName], actuator: &mut dyn Actuator) -> bool {
    let mut ok = true;
    let mut pressed = Vec::with_capacity(keys.len());
    for &key in keys {
        match actuator.key_down(key) {
            Ok(()) => pressed.push(key),
            Err(e) => {
                warn!(key = %key, error = %e, "Key press failed");
                ok = false;
            }
        }
    }
    for &key in pressed.iter().rev() {
        ok &= check(actuator.key_up(key), "key release", &key.to_string());
    }
    ok
}

fn button_name(button: PointerButton) -> &'static str {
    match button {
        PointerButton::Left => "left",
        PointerButton::Right => "right",
        PointerButton::Middle => "middle",
    }
}

fn check(result: Result<(), crate::actuation::ActuationError>, what: &str, target: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(operation = what, target = %target, error = %e, "Actuation failed");
            false
        }
    }
}
