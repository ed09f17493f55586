//! In-memory actuator that records calls
//!
//! Used by tests and replay tooling to observe exactly what the executor and
//! pointer mode asked of the host. Individual calls can be made to fail.

use super::keys::KeyName;
use super::{ActuationError, Actuator, PointerButton};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded capability call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuationCall {
    KeyDown(KeyName),
    KeyUp(KeyName),
    ButtonDown(PointerButton),
    ButtonUp(PointerButton),
    Click(PointerButton),
    MoveTo(i32, i32),
    MoveBy(i32, i32),
    Launch(String),
    OpenUrl(String),
    SetClipboard(String),
    Pause(Duration),
}

/// Shared view of a [`RecordingActuator`]'s history
#[derive(Debug, Clone, Default)]
pub struct ActuationLog(Arc<Mutex<Vec<ActuationCall>>>);

impl ActuationLog {
    fn push(&self, call: ActuationCall) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    /// Snapshot of all calls so far
    pub fn calls(&self) -> Vec<ActuationCall> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.0.lock() {
            calls.clear();
        }
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&ActuationCall) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }
}

type FailurePredicate = Box<dyn Fn(&ActuationCall) -> bool + Send>;

/// Records calls without touching the host. Pauses are recorded, not slept.
pub struct RecordingActuator {
    log: ActuationLog,
    screen: (u32, u32),
    fail_when: Option<FailurePredicate>,
}

impl RecordingActuator {
    pub fn new(screen: (u32, u32)) -> Self {
        Self {
            log: ActuationLog::default(),
            screen,
            fail_when: None,
        }
    }

    /// Make matching calls fail (after being recorded).
    pub fn failing_when(mut self, predicate: impl Fn(&ActuationCall) -> bool + Send + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    pub fn log(&self) -> ActuationLog {
        self.log.clone()
    }

    fn record(&mut self, call: ActuationCall) -> Result<(), ActuationError> {
        let fails = self.fail_when.as_ref().is_some_and(|f| f(&call));
        let description = format!("{:?}", call);
        self.log.push(call);
        if fails {
            Err(ActuationError::Input(format!("injected failure: {}", description)))
        } else {
            Ok(())
        }
    }
}

impl Actuator for RecordingActuator {
    fn key_down(&mut self, key: KeyName) -> Result<(), ActuationError> {
        self.record(ActuationCall::KeyDown(key))
    }

    fn key_up(&mut self, key: KeyName) -> Result<(), ActuationError> {
        self.record(ActuationCall::KeyUp(key))
    }

    fn button_down(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        self.record(ActuationCall::ButtonDown(button))
    }

    fn button_up(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        self.record(ActuationCall::ButtonUp(button))
    }

    fn click(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        self.record(ActuationCall::Click(button))
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuationError> {
        self.record(ActuationCall::MoveTo(x, y))
    }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), ActuationError> {
        self.record(ActuationCall::MoveBy(dx, dy))
    }

    fn launch(&mut self, command: &str) -> Result<(), ActuationError> {
        self.record(ActuationCall::Launch(command.to_string()))
    }

    fn open_url(&mut self, url: &str) -> Result<(), ActuationError> {
        self.record(ActuationCall::OpenUrl(url.to_string()))
    }

    fn set_clipboard(&mut self, text: &str) -> Result<(), ActuationError> {
        self.record(ActuationCall::SetClipboard(text.to_string()))
    }

    fn screen_size(&self) -> Result<(u32, u32), ActuationError> {
        Ok(self.screen)
    }

    fn pause(&mut self, duration: Duration) {
        let _ = self.record(ActuationCall::Pause(duration));
    }
}
