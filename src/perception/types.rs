//! Core perception types
//!
//! Landmark indices follow the 21-point hand topology used by common pose
//! estimators: wrist first, then four joints per digit from thumb to pinky.

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Number of keypoints per hand
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;

/// A 2D point. Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset_from(&self, origin: &Point2) -> Point2 {
        Point2::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn scaled(&self, factor: f64) -> Point2 {
        Point2::new(self.x * factor, self.y * factor)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from(pair: [f64; 2]) -> Self {
        Point2::new(pair[0], pair[1])
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

/// One perception frame: either no hand, or an ordered keypoint set.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Capture time
    pub timestamp: Timestamp,
    /// Whether the estimator reported a hand
    pub present: bool,
    /// Keypoints in [0,1] frame-relative coordinates
    pub points: Vec<Point2>,
}

impl LandmarkFrame {
    /// A frame in which no hand was detected
    pub fn no_hand(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            present: false,
            points: Vec::new(),
        }
    }

    /// A frame carrying a detected hand
    pub fn with_points(timestamp: Timestamp, points: Vec<Point2>) -> Self {
        Self {
            timestamp,
            present: !points.is_empty(),
            points,
        }
    }

    /// The keypoints, if a complete hand of `expected` points is present.
    ///
    /// A partial hand is a perception gap, not an error.
    pub fn hand(&self, expected: usize) -> Option<&[Point2]> {
        if self.present && self.points.len() == expected {
            Some(&self.points)
        } else {
            None
        }
    }

    /// Flip horizontally (`x → 1 − x`), as for a selfie-view camera.
    pub fn mirrored(mut self) -> Self {
        for p in &mut self.points {
            p.x = 1.0 - p.x;
        }
        self
    }
}
