//! Frame sources
//!
//! The estimator speaks newline-delimited JSON, one object per camera frame:
//!
//! ```text
//! {"t": 12.034, "hands": [[[0.51, 0.80], [0.47, 0.74], ...]]}
//! {"landmarks": [[0.51, 0.80, -0.01], ...]}
//! {"hands": []}
//! ```
//!
//! `t` is optional capture time in seconds; when absent the frame is stamped on
//! arrival. Only the first hand is used. A third coordinate is ignored.

use super::types::{LandmarkFrame, Point2};
use crate::time::Timestamp;
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info, warn};

/// Something that yields perception frames.
pub trait FrameSource {
    /// Block until the next frame. `Ok(None)` means the stream ended.
    fn next_frame(&mut self) -> crate::Result<Option<LandmarkFrame>>;
}

#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(default)]
    t: Option<f64>,
    #[serde(default)]
    hands: Option<Vec<Vec<Vec<f64>>>>,
    #[serde(default)]
    landmarks: Option<Vec<Vec<f64>>>,
}

fn to_points(raw: &[Vec<f64>]) -> Option<Vec<Point2>> {
    raw.iter()
        .map(|c| match c.as_slice() {
            [x, y, ..] => Some(Point2::new(*x, *y)),
            _ => None,
        })
        .collect()
}

/// Parse one wire line into a frame.
///
/// Malformed lines are logged and become "no hand" frames so a glitching
/// estimator never stops the loop.
pub fn parse_frame_line(line: &str, arrival: Timestamp) -> LandmarkFrame {
    let wire: WireFrame = match serde_json::from_str(line) {
        Ok(w) => w,
        Err(e) => {
            warn!(error = %e, "Unparseable perception line; treating as no hand");
            return LandmarkFrame::no_hand(arrival);
        }
    };

    let timestamp = wire.t.map(Timestamp::from_secs_f64).unwrap_or(arrival);

    let raw = wire
        .landmarks
        .or_else(|| wire.hands.and_then(|hands| hands.into_iter().next()));

    match raw.as_deref().map(to_points) {
        Some(Some(points)) => LandmarkFrame::with_points(timestamp, points),
        Some(None) => {
            warn!("Landmark with fewer than two coordinates; treating as no hand");
            LandmarkFrame::no_hand(timestamp)
        }
        None => LandmarkFrame::no_hand(timestamp),
    }
}

/// Reads frames from any buffered line stream (stdin, a file, a pipe).
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line: String,
    mirror: bool,
    frames_read: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            mirror: false,
            frames_read: 0,
        }
    }

    /// Flip every frame horizontally before handing it out.
    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// Frames delivered so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Read the next raw line, skipping blanks. `None` at end of stream.
    fn read_line(&mut self) -> crate::Result<Option<&str>> {
        loop {
            self.line.clear();
            let n = self.reader.read_line(&mut self.line)?;
            if n == 0 {
                return Ok(None);
            }
            if !self.line.trim().is_empty() {
                return Ok(Some(self.line.trim()));
            }
        }
    }
}

impl JsonLinesSource<BufReader<std::fs::File>> {
    /// Open a recorded frame file.
    pub fn open(path: &std::path::Path) -> crate::Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            crate::Error::Perception(format!("cannot open frame file {:?}: {}", path, e))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> crate::Result<Option<LandmarkFrame>> {
        let arrival = Timestamp::now();
        let mirror = self.mirror;
        let frame = match self.read_line()? {
            Some(line) => parse_frame_line(line, arrival),
            None => return Ok(None),
        };
        self.frames_read += 1;
        Ok(Some(if mirror { frame.mirrored() } else { frame }))
    }
}

/// Runs the pose estimator as a child process and reads its stdout.
pub struct SidecarSource {
    child: Child,
    inner: JsonLinesSource<BufReader<ChildStdout>>,
}

impl SidecarSource {
    /// Spawn the estimator and wait for its ready line.
    ///
    /// Any failure here is startup-fatal: running the loop without a
    /// perception service would silently do nothing.
    pub fn spawn(argv: &[String], ready_line: &str, mirror: bool) -> crate::Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| crate::Error::Perception("no perception command configured".into()))?;

        info!(program = %program, "Starting perception service");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                crate::Error::Perception(format!("failed to start '{}': {}", program, e))
            })?;

        let stdout = match child.stdout.take() {
            Some(s) => s,
            None => {
                let _ = child.kill();
                return Err(crate::Error::Perception(
                    "perception service has no stdout".into(),
                ));
            }
        };

        let mut source = Self {
            child,
            inner: JsonLinesSource::new(BufReader::new(stdout)).with_mirror(mirror),
        };

        if !ready_line.is_empty() {
            match source.inner.read_line()? {
                Some(line) if line == ready_line => {
                    info!("Perception service ready");
                }
                Some(other) => {
                    let other = other.to_string();
                    source.shutdown();
                    return Err(crate::Error::Perception(format!(
                        "expected '{}' from perception service, got '{}'",
                        ready_line, other
                    )));
                }
                None => {
                    source.shutdown();
                    return Err(crate::Error::Perception(
                        "perception service exited before signalling ready".into(),
                    ));
                }
            }
        }

        Ok(source)
    }

    fn shutdown(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            debug!("Stopping perception service");
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl FrameSource for SidecarSource {
    fn next_frame(&mut self) -> crate::Result<Option<LandmarkFrame>> {
        self.inner.next_frame()
    }
}

impl Drop for SidecarSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_hands_array() {
        let frame = parse_frame_line(
            r#"{"t": 2.5, "hands": [[[0.1, 0.2], [0.3, 0.4, 0.0]]]}"#,
            Timestamp::default(),
        );
        assert!(frame.present);
        assert_eq!(frame.points, vec![Point2::new(0.1, 0.2), Point2::new(0.3, 0.4)]);
        assert_eq!(frame.timestamp.as_millis(), 2_500);
    }

    #[test]
    fn test_parse_landmarks_field() {
        let frame = parse_frame_line(r#"{"landmarks": [[0.5, 0.5, 0.1]]}"#, Timestamp::from_millis(7));
        assert!(frame.present);
        assert_eq!(frame.timestamp.as_millis(), 7);
    }

    #[test]
    fn test_parse_empty_hands_is_no_hand() {
        let frame = parse_frame_line(r#"{"hands": []}"#, Timestamp::default());
        assert!(!frame.present);
        assert!(frame.points.is_empty());
    }

    #[test]
    fn test_parse_garbage_is_no_hand() {
        let frame = parse_frame_line("not json", Timestamp::from_millis(3));
        assert!(!frame.present);
        assert_eq!(frame.timestamp.as_millis(), 3);
    }

    #[test]
    fn test_parse_short_coordinate_is_no_hand() {
        let frame = parse_frame_line(r#"{"landmarks": [[0.5]]}"#, Timestamp::default());
        assert!(!frame.present);
    }

    #[test]
    fn test_json_lines_source_skips_blank_lines() {
        let input = "{\"hands\": []}\n\n{\"landmarks\": [[0.2, 0.3]]}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        let first = source.next_frame().unwrap().unwrap();
        assert!(!first.present);
        let second = source.next_frame().unwrap().unwrap();
        assert!(second.present);
        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.frames_read(), 2);
    }

    #[test]
    fn test_json_lines_source_mirror() {
        let input = "{\"landmarks\": [[0.2, 0.3]]}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input)).with_mirror(true);
        let frame = source.next_frame().unwrap().unwrap();
        assert!((frame.points[0].x - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_sidecar_without_command_fails() {
        let result = SidecarSource::spawn(&[], "READY", false);
        assert!(matches!(result, Err(crate::Error::Perception(_))));
    }

    #[test]
    fn test_sidecar_missing_program_fails() {
        let argv = vec!["/nonexistent/pose-estimator-12345".to_string()];
        let result = SidecarSource::spawn(&argv, "READY", false);
        assert!(matches!(result, Err(crate::Error::Perception(_))));
    }
}
