//! Terminal status line
//!
//! Shows the gesture being held with a progress bar, and the pointer state
//! while follow is on. Redrawn in place on stderr only when it changes.

use std::io::Write;

const BAR_WIDTH: usize = 20;

/// What the status line shows for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStatus<'a> {
    pub paused: bool,
    /// Candidate gesture and hold progress in [0, 1]
    pub holding: Option<(&'a str, f64)>,
    /// `None` when follow is off, otherwise whether a drag is active
    pub pointer: Option<bool>,
}

/// Render the status line.
pub fn format_status(status: &OverlayStatus<'_>) -> String {
    if status.paused {
        return "[paused]".to_string();
    }

    let mut parts = Vec::new();
    if let Some(dragging) = status.pointer {
        parts.push(format!("MOUSE: {}", if dragging { "DRAGGING" } else { "MOVE" }));
    }
    match status.holding {
        Some((name, progress)) => {
            let progress = progress.clamp(0.0, 1.0);
            let filled = (progress * BAR_WIDTH as f64).round() as usize;
            parts.push(format!(
                "{} [{}{}] {:>3}%",
                name,
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled),
                (progress * 100.0).round() as u32
            ));
        }
        None => parts.push("-".to_string()),
    }
    parts.join("  ")
}

/// In-place status line writer
#[derive(Debug, Default)]
pub struct StatusOverlay {
    last: String,
}

impl StatusOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, status: &OverlayStatus<'_>) {
        let line = format_status(status);
        if line == self.last {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r\x1b[2K{}", line);
        let _ = stderr.flush();
        self.last = line;
    }

    /// End the status line so later output starts on a fresh line.
    pub fn finish(&mut self) {
        if !self.last.is_empty() {
            let _ = writeln!(std::io::stderr());
            self.last.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle() {
        let status = OverlayStatus {
            paused: false,
            holding: None,
            pointer: None,
        };
        assert_eq!(format_status(&status), "-");
    }

    #[test]
    fn test_progress_bar() {
        let status = OverlayStatus {
            paused: false,
            holding: Some(("fist", 0.5)),
            pointer: None,
        };
        assert_eq!(format_status(&status), "fist [##########----------]  50%");
    }

    #[test]
    fn test_pointer_status_first() {
        let status = OverlayStatus {
            paused: false,
            holding: Some(("palm", 1.0)),
            pointer: Some(true),
        };
        let line = format_status(&status);
        assert!(line.starts_with("MOUSE: DRAGGING"));
        assert!(line.ends_with("100%"));
    }

    #[test]
    fn test_paused() {
        let status = OverlayStatus {
            paused: true,
            holding: Some(("x", 0.3)),
            pointer: Some(false),
        };
        assert_eq!(format_status(&status), "[paused]");
    }
}
