//! Integration tests for the recognition pipeline
//!
//! Wire line -> LandmarkFrame -> normalize -> classify -> trigger latch

use gesture_control::perception::{parse_frame_line, FrameSource, JsonLinesSource, Point2};
use gesture_control::recognition::{
    normalize_landmarks, Classifier, GestureTemplate, TriggerPhase, TriggerStateMachine,
};
use gesture_control::time::Timestamp;
use std::io::Cursor;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

/// A 21-point hand whose shape depends on `curl`
fn make_hand(curl: f64, offset: (f64, f64), scale: f64) -> Vec<Point2> {
    (0..21)
        .map(|i| {
            let finger = (i / 4) as f64;
            let joint = (i % 4) as f64;
            let x = finger * 0.05 + joint * 0.01 * curl;
            let y = -joint * 0.04 * (1.0 - 0.5 * curl) - finger * 0.01;
            Point2::new(offset.0 + x * scale, offset.1 + y * scale)
        })
        .collect()
}

fn wire_line(t: f64, points: &[Point2]) -> String {
    let coords: Vec<String> = points.iter().map(|p| format!("[{},{}]", p.x, p.y)).collect();
    format!("{{\"t\": {}, \"hands\": [[{}]]}}", t, coords.join(","))
}

// ============================================================================
// Normalization + classification
// ============================================================================

#[test]
fn test_same_shape_matches_anywhere_in_frame() {
    let template = GestureTemplate::capture("open", &make_hand(0.0, (0.5, 0.8), 1.0));
    let classifier = Classifier::with_threshold(0.07);

    let moved = make_hand(0.0, (0.2, 0.6), 0.5);
    let result = classifier.classify(&normalize_landmarks(&moved), std::slice::from_ref(&template));

    assert_eq!(result.name.as_deref(), Some("open"));
    assert!(result.distance < 1e-9);
}

#[test]
fn test_nearest_template_wins() {
    let templates = vec![
        GestureTemplate::capture("open", &make_hand(0.0, (0.5, 0.8), 1.0)),
        GestureTemplate::capture("fist", &make_hand(1.0, (0.5, 0.8), 1.0)),
    ];
    let classifier = Classifier::with_threshold(0.07);

    let almost_fist = make_hand(0.95, (0.4, 0.7), 1.2);
    let result = classifier.classify(&normalize_landmarks(&almost_fist), &templates);
    assert_eq!(result.name.as_deref(), Some("fist"));
}

#[test]
fn test_no_templates_no_match() {
    let classifier = Classifier::new();
    let result = classifier.classify(&normalize_landmarks(&make_hand(0.5, (0.5, 0.5), 1.0)), &[]);
    assert!(result.name.is_none());
}

#[test]
fn test_classifier_compares_as_given() {
    let template = GestureTemplate::new(
        "flat",
        vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
    );
    let classifier = Classifier::with_threshold(0.1);

    let same = classifier.classify(
        &[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
        std::slice::from_ref(&template),
    );
    assert_eq!(same.name.as_deref(), Some("flat"));
    assert_eq!(same.distance, 0.0);

    let stretched = classifier.classify(
        &[Point2::new(0.0, 0.0), Point2::new(5.0, 0.0)],
        std::slice::from_ref(&template),
    );
    assert!(stretched.name.is_none());
}

// ============================================================================
// Wire format through the trigger
// ============================================================================

#[test]
fn test_stream_fires_once_per_hold() {
    let fist = make_hand(1.0, (0.5, 0.8), 1.0);
    let templates = vec![GestureTemplate::capture("fist", &fist)];
    let classifier = Classifier::with_threshold(0.07);
    let mut trigger = TriggerStateMachine::new(Duration::from_millis(500));

    let mut lines = Vec::new();
    for i in 0..=20 {
        lines.push(wire_line(i as f64 * 0.05, &fist));
    }
    lines.push("{\"t\": 1.1, \"hands\": []}".to_string());
    for i in 0..=12 {
        lines.push(wire_line(1.2 + i as f64 * 0.05, &fist));
    }

    let mut source = JsonLinesSource::new(Cursor::new(lines.join("\n")));
    let mut fires = Vec::new();
    while let Some(frame) = source.next_frame().unwrap() {
        let detected = frame
            .hand(21)
            .map(|points| classifier.classify(&normalize_landmarks(points), &templates))
            .and_then(|m| m.name);
        if let Some(event) = trigger.update(detected.as_deref(), false, frame.timestamp) {
            fires.push((event.gesture, frame.timestamp));
        }
    }

    assert_eq!(fires.len(), 2);
    assert!(fires.iter().all(|(name, _)| name == "fist"));
    assert_eq!(source.frames_read(), 35);
}

#[test]
fn test_garbage_line_is_no_hand() {
    let frame = parse_frame_line("not json at all", Timestamp::from_millis(42));
    assert!(frame.hand(21).is_none());
    assert_eq!(frame.timestamp, Timestamp::from_millis(42));
}

#[test]
fn test_wrong_landmark_count_is_no_hand() {
    let line = wire_line(0.0, &make_hand(0.0, (0.5, 0.5), 1.0)[..10]);
    let frame = parse_frame_line(&line, Timestamp::from_millis(0));
    assert!(frame.hand(21).is_none());
}

#[test]
fn test_dragging_blocks_firing() {
    let mut trigger = TriggerStateMachine::new(Duration::from_millis(500));
    for ms in (0..=1_000).step_by(50) {
        assert!(trigger
            .update(Some("fist"), true, Timestamp::from_millis(ms))
            .is_none());
    }
    assert_ne!(trigger.phase(), TriggerPhase::Fired);
}
