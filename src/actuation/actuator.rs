//! Actuation capability trait

use super::keys::KeyName;
use std::time::Duration;

/// Errors from the host input and process facilities
#[derive(Debug, thiserror::Error)]
pub enum ActuationError {
    #[error("input backend unavailable: {0}")]
    Unavailable(String),

    #[error("input synthesis failed: {0}")]
    Input(String),

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

/// Physical pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Everything the executor and pointer mode may do to the host.
///
/// Implementations report failures; callers decide whether to log and
/// continue.
pub trait Actuator {
    fn key_down(&mut self, key: KeyName) -> Result<(), ActuationError>;

    fn key_up(&mut self, key: KeyName) -> Result<(), ActuationError>;

    fn button_down(&mut self, button: PointerButton) -> Result<(), ActuationError>;

    fn button_up(&mut self, button: PointerButton) -> Result<(), ActuationError>;

    /// Press and release at the current cursor position
    fn click(&mut self, button: PointerButton) -> Result<(), ActuationError>;

    /// Move the cursor to absolute screen pixels
    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuationError>;

    /// Move the cursor relative to its current position
    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), ActuationError>;

    /// Start a process or open a document without waiting for it
    fn launch(&mut self, command: &str) -> Result<(), ActuationError>;

    /// Open a URL with the default handler
    fn open_url(&mut self, url: &str) -> Result<(), ActuationError>;

    fn set_clipboard(&mut self, text: &str) -> Result<(), ActuationError>;

    /// Main display size in pixels
    fn screen_size(&self) -> Result<(u32, u32), ActuationError>;

    /// Block the calling thread
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn key_down(&mut self, key: KeyName) -> Result<(), ActuationError> {
        (**self).key_down(key)
    }

    fn key_up(&mut self, key: KeyName) -> Result<(), ActuationError> {
        (**self).key_up(key)
    }

    fn button_down(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        (**self).button_down(button)
    }

    fn button_up(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        (**self).button_up(button)
    }

    fn click(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        (**self).click(button)
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuationError> {
        (**self).move_to(x, y)
    }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), ActuationError> {
        (**self).move_by(dx, dy)
    }

    fn launch(&mut self, command: &str) -> Result<(), ActuationError> {
        (**self).launch(command)
    }

    fn open_url(&mut self, url: &str) -> Result<(), ActuationError> {
        (**self).open_url(url)
    }

    fn set_clipboard(&mut self, text: &str) -> Result<(), ActuationError> {
        (**self).set_clipboard(text)
    }

    fn screen_size(&self) -> Result<(u32, u32), ActuationError> {
        (**self).screen_size()
    }

    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }
}
