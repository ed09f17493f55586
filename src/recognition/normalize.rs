//! Landmark Normalization
//!
//! Makes a hand shape independent of where it is in the frame and how large it
//! appears: every point is expressed relative to the wrist and divided by the
//! largest absolute coordinate.

use crate::perception::Point2;

/// Normalize a keypoint set.
///
/// Each output point is `(p − p[0]) / m`, where `m` is the largest absolute
/// x or y value after the subtraction. If `m` is zero (all points coincide)
/// the centered points are returned unscaled.
pub fn normalize_landmarks(points: &[Point2]) -> Vec<Point2> {
    let Some(base) = points.first() else {
        return Vec::new();
    };

    let centered: Vec<Point2> = points.iter().map(|p| p.offset_from(base)).collect();

    let max_value = centered
        .iter()
        .flat_map(|p| [p.x.abs(), p.y.abs()])
        .fold(0.0_f64, f64::max);

    if max_value > 0.0 {
        centered.iter().map(|p| p.scaled(1.0 / max_value)).collect()
    } else {
        centered
    }
}
