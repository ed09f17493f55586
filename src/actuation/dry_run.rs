//! Logging-only actuator for `--dry-run`

use super::keys::KeyName;
use super::{ActuationError, Actuator, PointerButton};
use tracing::{debug, info};

/// Logs every capability call instead of touching the host.
///
/// Tracks a virtual cursor so relative moves log meaningful positions.
pub struct DryRunActuator {
    screen: (u32, u32),
    cursor: (i32, i32),
}

impl DryRunActuator {
    pub fn new(screen: (u32, u32)) -> Self {
        Self {
            screen,
            cursor: (screen.0 as i32 / 2, screen.1 as i32 / 2),
        }
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    fn clamp_cursor(&mut self) {
        self.cursor.0 = self.cursor.0.clamp(0, self.screen.0 as i32);
        self.cursor.1 = self.cursor.1.clamp(0, self.screen.1 as i32);
    }
}

impl Actuator for DryRunActuator {
    fn key_down(&mut self, key: KeyName) -> Result<(), ActuationError> {
        info!(key = %key, "[dry-run] key down");
        Ok(())
    }

    fn key_up(&mut self, key: KeyName) -> Result<(), ActuationError> {
        info!(key = %key, "[dry-run] key up");
        Ok(())
    }

    fn button_down(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        info!(?button, x = self.cursor.0, y = self.cursor.1, "[dry-run] button down");
        Ok(())
    }

    fn button_up(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        info!(?button, x = self.cursor.0, y = self.cursor.1, "[dry-run] button up");
        Ok(())
    }

    fn click(&mut self, button: PointerButton) -> Result<(), ActuationError> {
        info!(?button, x = self.cursor.0, y = self.cursor.1, "[dry-run] click");
        Ok(())
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), ActuationError> {
        self.cursor = (x, y);
        self.clamp_cursor();
        debug!(x, y, "[dry-run] move");
        Ok(())
    }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), ActuationError> {
        self.cursor = (self.cursor.0 + dx, self.cursor.1 + dy);
        self.clamp_cursor();
        debug!(dx, dy, x = self.cursor.0, y = self.cursor.1, "[dry-run] move by");
        Ok(())
    }

    fn launch(&mut self, command: &str) -> Result<(), ActuationError> {
        info!(command = %command, "[dry-run] launch");
        Ok(())
    }

    fn open_url(&mut self, url: &str) -> Result<(), ActuationError> {
        info!(url = %super::platform::normalize_url(url), "[dry-run] open url");
        Ok(())
    }

    fn set_clipboard(&mut self, text: &str) -> Result<(), ActuationError> {
        info!(chars = text.chars().count(), "[dry-run] set clipboard");
        Ok(())
    }

    fn screen_size(&self) -> Result<(u32, u32), ActuationError> {
        Ok(self.screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_cursor_tracks_moves() {
        let mut dry = DryRunActuator::new((200, 100));
        assert_eq!(dry.cursor(), (100, 50));
        dry.move_by(30, -10).unwrap();
        assert_eq!(dry.cursor(), (130, 40));
        dry.move_by(500, 500).unwrap();
        assert_eq!(dry.cursor(), (200, 100));
        dry.move_to(-5, 20).unwrap();
        assert_eq!(dry.cursor(), (0, 20));
    }

    #[test]
    fn test_everything_succeeds() {
        let mut dry = DryRunActuator::new((1920, 1080));
        assert!(dry.key_down(KeyName::Control).is_ok());
        assert!(dry.launch("rm -rf /").is_ok());
        assert!(dry.set_clipboard("x").is_ok());
        assert_eq!(dry.screen_size().unwrap(), (1920, 1080));
    }
}
