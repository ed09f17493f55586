//! Nearest-Template Gesture Classifier
//!
//! Compares a normalized hand shape against every registered template using
//! the mean per-point Euclidean distance, and accepts the closest one only if
//! it is strictly under the rejection threshold.

use super::normalize::normalize_landmarks;
use crate::perception::Point2;
use serde::{Deserialize, Serialize};

/// Default rejection threshold
pub const DEFAULT_THRESHOLD: f64 = 0.07;

/// A registered gesture: a name and a normalized point set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureTemplate {
    pub name: String,
    pub points: Vec<Point2>,
}

impl GestureTemplate {
    pub fn new(name: impl Into<String>, points: Vec<Point2>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Build a template from raw (unnormalized) landmarks.
    pub fn capture(name: impl Into<String>, raw: &[Point2]) -> Self {
        Self::new(name, normalize_landmarks(raw))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Outcome of one classification
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Accepted template name, if any
    pub name: Option<String>,
    /// Smallest mean distance seen; `+∞` when no template was comparable
    pub distance: f64,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            name: None,
            distance: f64::INFINITY,
        }
    }

    pub fn is_match(&self) -> bool {
        self.name.is_some()
    }
}

/// Mean Euclidean distance between two equally sized point sets.
pub fn mean_distance(a: &[Point2], b: &[Point2]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let total: f64 = a.iter().zip(b).map(|(p, q)| p.distance_to(q)).sum();
    total / a.len() as f64
}

/// Nearest-template classifier
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    /// Matches must be strictly closer than this
    pub threshold: f64,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Classify an already-normalized candidate.
    ///
    /// Templates are visited in slice order; on equal distance the earlier
    /// template wins. Templates with a different point count are skipped.
    pub fn classify(&self, candidate: &[Point2], templates: &[GestureTemplate]) -> MatchResult {
        let mut best: Option<&GestureTemplate> = None;
        let mut min_dist = f64::INFINITY;

        for template in templates {
            if template.points.len() != candidate.len() {
                continue;
            }
            let dist = mean_distance(candidate, &template.points);
            if dist < min_dist {
                min_dist = dist;
                best = Some(template);
            }
        }

        match best {
            Some(t) if min_dist < self.threshold => MatchResult {
                name: Some(t.name.clone()),
                distance: min_dist,
            },
            _ => MatchResult {
                name: None,
                distance: min_dist,
            },
        }
    }

    /// Normalize raw landmarks, then classify.
    pub fn classify_raw(&self, raw: &[Point2], templates: &[GestureTemplate]) -> MatchResult {
        if raw.is_empty() {
            return MatchResult::none();
        }
        self.classify(&normalize_landmarks(raw), templates)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
