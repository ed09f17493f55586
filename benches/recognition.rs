//! Criterion benchmarks for the per-frame recognition hot path
//!
//! Covers: landmark normalization, nearest-template classification over
//! growing template sets, and the trigger latch update.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gesture_control::perception::{Point2, LANDMARK_COUNT};
use gesture_control::recognition::{
    normalize_landmarks, Classifier, GestureTemplate, TriggerStateMachine,
};
use gesture_control::time::Timestamp;
use std::time::Duration;

fn make_hand(seed: usize) -> Vec<Point2> {
    (0..LANDMARK_COUNT)
        .map(|i| {
            let phase = (i + seed) as f64 * 0.37;
            Point2::new(0.5 + 0.1 * phase.cos(), 0.5 + 0.1 * phase.sin() + i as f64 * 0.01)
        })
        .collect()
}

fn make_templates(count: usize) -> Vec<GestureTemplate> {
    (0..count)
        .map(|i| GestureTemplate::capture(format!("gesture_{}", i), &make_hand(i * 3)))
        .collect()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn bench_normalize(c: &mut Criterion) {
    let hand = make_hand(7);

    c.bench_function("normalize_landmarks", |b| {
        b.iter(|| normalize_landmarks(black_box(&hand)));
    });
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let classifier = Classifier::with_threshold(0.07);
    let candidate = normalize_landmarks(&make_hand(11));

    for count in [1, 10, 50, 200] {
        let templates = make_templates(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &templates, |b, templates| {
            b.iter(|| classifier.classify(black_box(&candidate), black_box(templates)));
        });
    }

    group.finish();
}

fn bench_normalize_and_classify(c: &mut Criterion) {
    let classifier = Classifier::with_threshold(0.07);
    let templates = make_templates(20);
    let hand = make_hand(5);

    c.bench_function("frame_recognition_20_templates", |b| {
        b.iter(|| {
            let normalized = normalize_landmarks(black_box(&hand));
            classifier.classify(&normalized, &templates)
        });
    });
}

// ---------------------------------------------------------------------------
// Trigger latch
// ---------------------------------------------------------------------------

fn bench_trigger_update(c: &mut Criterion) {
    c.bench_function("trigger_update", |b| {
        let mut trigger = TriggerStateMachine::new(Duration::from_millis(500));
        let mut ms = 0u64;
        b.iter(|| {
            ms += 33;
            let detected = if (ms / 1_000) % 2 == 0 { Some("fist") } else { None };
            trigger.update(black_box(detected), false, Timestamp::from_millis(ms))
        });
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_classify,
    bench_normalize_and_classify,
    bench_trigger_update
);
criterion_main!(benches);
