//! Integration tests for the control loop
//!
//! Synthetic frames drive the full loop against a recording actuator:
//! recognition -> trigger -> resolution -> execution, pointer follow with
//! drag, and commands arriving over the handle.

use gesture_control::actuation::{ActuationCall, ActuationLog, KeyName, PointerButton, RecordingActuator};
use gesture_control::app::config::Config;
use gesture_control::context::{ContextProvider, StaticContext};
use gesture_control::control::{ControlLoop, Dispatch, LoopCommand};
use gesture_control::perception::{
    FrameSource, JsonLinesSource, LandmarkFrame, Point2, INDEX_MCP, INDEX_TIP, THUMB_TIP,
};
use gesture_control::profile::{ActionSpec, ProfileStore, GLOBAL};
use gesture_control::recognition::GestureTemplate;
use gesture_control::time::Timestamp;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

/// A hand pose; `lean` changes the shape, `tip` places the index fingertip
/// and `thumb_up` raises the thumb above the index knuckle.
fn make_hand(lean: f64, tip: (f64, f64), thumb_up: bool) -> Vec<Point2> {
    let mut points: Vec<Point2> = (0..21)
        .map(|i| Point2::new(0.3 + i as f64 * 0.01 * lean, 0.9 - i as f64 * 0.02))
        .collect();
    points[INDEX_TIP] = Point2::new(tip.0, tip.1);
    let knuckle = points[INDEX_MCP];
    points[THUMB_TIP] = Point2::new(
        knuckle.x - 0.02,
        if thumb_up { knuckle.y - 0.05 } else { knuckle.y + 0.01 },
    );
    points
}

fn frame(ms: u64, hand: Option<Vec<Point2>>) -> LandmarkFrame {
    let ts = Timestamp::from_millis(ms);
    match hand {
        Some(points) => LandmarkFrame::with_points(ts, points),
        None => LandmarkFrame::no_hand(ts),
    }
}

/// Context provider whose answer the test can change mid-run
#[derive(Clone, Default)]
struct SharedContext(Arc<Mutex<String>>);

impl SharedContext {
    fn set(&self, name: &str) {
        *self.0.lock().unwrap() = name.to_string();
    }
}

impl ContextProvider for SharedContext {
    fn active_context(&mut self) -> String {
        self.0.lock().unwrap().clone()
    }
}

struct Harness {
    control: ControlLoop,
    log: ActuationLog,
}

fn harness(store: ProfileStore, actuator: RecordingActuator, context: Box<dyn ContextProvider>) -> Harness {
    let log = actuator.log();
    let mut config = Config::default();
    config.pointer.screen_width = Some(1000);
    config.pointer.screen_height = Some(800);
    let control = ControlLoop::new(&config, store, Box::new(actuator), context);
    Harness { control, log }
}

fn store_with(mappings: &[(&str, &str, f64, ActionSpec)]) -> ProfileStore {
    let mut store = ProfileStore::new();
    for (scope, name, lean, action) in mappings {
        if store.template(name).is_none() {
            let hand = make_hand(*lean, (0.5, 0.5), false);
            store.register_gesture(GestureTemplate::capture(*name, &hand)).unwrap();
        }
        store.set_action(scope, name, action.clone()).unwrap();
    }
    store
}

/// Hold one pose every 50 ms over `[from, to]`.
fn hold(control: &mut ControlLoop, lean: f64, from: u64, to: u64) -> Vec<Option<Dispatch>> {
    (from..=to)
        .step_by(50)
        .map(|t| {
            control
                .process_frame(&frame(t, Some(make_hand(lean, (0.5, 0.5), false))))
                .dispatch
        })
        .collect()
}

// ============================================================================
// Firing and resolution
// ============================================================================

#[test]
fn test_context_switch_changes_resolution() {
    let store = store_with(&[
        (GLOBAL, "fist", 1.0, ActionSpec::MouseClick(gesture_control::profile::MouseButton::Left)),
        ("Notepad", "fist", 1.0, ActionSpec::Launch("notepad-helper".into())),
    ]);
    let context = SharedContext::default();
    context.set("Notepad");
    let mut h = harness(store, RecordingActuator::new((1000, 800)), Box::new(context.clone()));

    hold(&mut h.control, 1.0, 0, 600);
    h.control.process_frame(&frame(650, None));
    context.set("Browser");
    hold(&mut h.control, 1.0, 700, 1_300);

    assert_eq!(
        h.log.calls(),
        vec![
            ActuationCall::Launch("notepad-helper".into()),
            ActuationCall::Click(PointerButton::Left),
        ]
    );
}

#[test]
fn test_chain_continues_past_failed_step() {
    let chain: ActionSpec = "chain:wait:100|hotkey:ctrl+s|app:after".parse().unwrap();
    let store = store_with(&[(GLOBAL, "fist", 1.0, chain)]);
    let actuator = RecordingActuator::new((1000, 800))
        .failing_when(|call| matches!(call, ActuationCall::KeyDown(_)));
    let mut h = harness(store, actuator, Box::new(StaticContext::global()));

    let dispatches = hold(&mut h.control, 1.0, 0, 600);
    let report = dispatches
        .into_iter()
        .flatten()
        .find_map(|d| match d {
            Dispatch::Executed { report, .. } => Some(report),
            _ => None,
        })
        .unwrap();
    assert_eq!(report.attempted, 3);
    assert_eq!(report.failed, 1);

    let calls = h.log.calls();
    let wait_at = calls
        .iter()
        .position(|c| *c == ActuationCall::Pause(Duration::from_millis(100)))
        .unwrap();
    let key_at = calls
        .iter()
        .position(|c| matches!(c, ActuationCall::KeyDown(KeyName::Control)))
        .unwrap();
    assert!(wait_at < key_at);
    assert_eq!(calls.last(), Some(&ActuationCall::Launch("after".into())));
}

#[test]
fn test_flicker_fires_again() {
    let store = store_with(&[(GLOBAL, "fist", 1.0, ActionSpec::Wait(0))]);
    let mut h = harness(store, RecordingActuator::new((1000, 800)), Box::new(StaticContext::global()));

    hold(&mut h.control, 1.0, 0, 550);
    h.control.process_frame(&frame(600, None));
    hold(&mut h.control, 1.0, 650, 1_200);

    assert_eq!(h.control.stats().fires, 2);
}

// ============================================================================
// Pointer follow and drag
// ============================================================================

#[test]
fn test_follow_drag_presses_and_releases_once() {
    let toggle: ActionSpec = "special:toggle_follow".parse().unwrap();
    let store = store_with(&[(GLOBAL, "point", 1.0, toggle)]);
    let mut h = harness(store, RecordingActuator::new((1000, 800)), Box::new(StaticContext::global()));

    hold(&mut h.control, 1.0, 0, 600);
    assert!(h.control.pointer().is_following());
    h.log.clear();

    // Thumb up over several frames, then down again
    let mut t = 700;
    for thumb_up in [false, true, true, true, false, false] {
        let hand = make_hand(4.0, (0.4, 0.6), thumb_up);
        h.control.process_frame(&frame(t, Some(hand)));
        t += 50;
    }

    let downs = h.log.count(|c| matches!(c, ActuationCall::ButtonDown(PointerButton::Left)));
    let ups = h.log.count(|c| matches!(c, ActuationCall::ButtonUp(PointerButton::Left)));
    assert_eq!(downs, 1);
    assert_eq!(ups, 1);
    assert!(!h.control.pointer().is_dragging());
}

#[test]
fn test_toggle_gesture_exits_follow_after_lost_drag() {
    let toggle: ActionSpec = "special:toggle_follow".parse().unwrap();
    let store = store_with(&[(GLOBAL, "point", 1.0, toggle)]);
    let mut h = harness(store, RecordingActuator::new((1000, 800)), Box::new(StaticContext::global()));

    let on = hold(&mut h.control, 1.0, 0, 600);
    assert!(on.contains(&Some(Dispatch::ToggledFollow(true))));

    // Drag engaged, then the hand leaves with the button still down
    h.control
        .process_frame(&frame(650, Some(make_hand(4.0, (0.4, 0.6), true))));
    assert!(h.control.pointer().is_dragging());
    h.control.process_frame(&frame(700, None));
    assert!(h.control.pointer().is_dragging());

    let off = hold(&mut h.control, 1.0, 750, 1_400);
    assert!(off.contains(&Some(Dispatch::ToggledFollow(false))));
    assert!(!h.control.pointer().is_following());
    assert!(!h.control.pointer().is_dragging());

    let calls = h.log.calls();
    assert_eq!(calls.iter().filter(|c| matches!(c, ActuationCall::ButtonDown(_))).count(), 1);
    assert_eq!(calls.iter().filter(|c| matches!(c, ActuationCall::ButtonUp(_))).count(), 1);
    let down_at = calls.iter().position(|c| matches!(c, ActuationCall::ButtonDown(_))).unwrap();
    let up_at = calls.iter().position(|c| matches!(c, ActuationCall::ButtonUp(_))).unwrap();
    assert!(down_at < up_at);

    // Follow is off: the cursor stays put
    h.log.clear();
    h.control.process_frame(&frame(1_500, None));
    hold(&mut h.control, 4.0, 1_550, 1_700);
    assert!(h.log.calls().is_empty());
}

#[test]
fn test_toggle_off_releases_drag() {
    let store = ProfileStore::new();
    let mut h = harness(store, RecordingActuator::new((1000, 800)), Box::new(StaticContext::global()));

    h.control.apply_command(LoopCommand::ToggleFollow);
    h.control
        .process_frame(&frame(0, Some(make_hand(1.0, (0.5, 0.5), true))));
    assert!(h.control.pointer().is_dragging());

    h.control.apply_command(LoopCommand::ToggleFollow);
    assert!(!h.control.pointer().is_following());
    assert!(!h.control.pointer().is_dragging());
    assert_eq!(
        h.log.count(|c| matches!(c, ActuationCall::ButtonUp(_))),
        1
    );
}

// ============================================================================
// Commands and persistence
// ============================================================================

#[test]
fn test_commands_over_handle_persist_store() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");
    let store = ProfileStore::load_or_default(&path);

    let mut h = harness(store, RecordingActuator::new((1000, 800)), Box::new(StaticContext::global()));
    let handle = h.control.handle();

    // A frame with the pose to capture, then the save and a quit
    let hand = make_hand(2.0, (0.5, 0.5), false);
    let coords: Vec<String> = hand.iter().map(|p| format!("[{},{}]", p.x, p.y)).collect();
    let line = format!("{{\"t\": 0.0, \"hands\": [[{}]]}}\n", coords.join(","));
    let source = JsonLinesSource::new(Cursor::new(line.repeat(3)));

    struct ThenCommands<S> {
        inner: S,
        after: usize,
        seen: usize,
        handle: gesture_control::control::ControlHandle,
    }
    impl<S: FrameSource> FrameSource for ThenCommands<S> {
        fn next_frame(&mut self) -> gesture_control::Result<Option<LandmarkFrame>> {
            self.seen += 1;
            if self.seen == self.after {
                self.handle.send(LoopCommand::SaveGesture {
                    name: "peace".into(),
                    scope: GLOBAL.into(),
                    action: Some(ActionSpec::Hotkey("ctrl+v".into())),
                });
                self.handle.send(LoopCommand::SetSetting {
                    key: "threshold".into(),
                    value: "0.05".into(),
                });
            }
            self.inner.next_frame()
        }
    }

    let stats = h
        .control
        .run(ThenCommands { inner: source, after: 2, seen: 0, handle })
        .unwrap();
    assert_eq!(stats.frames, 3);

    let reloaded = ProfileStore::load(&path).unwrap();
    assert!(reloaded.template("peace").is_some());
    assert_eq!(reloaded.settings().threshold, 0.05);
    assert_eq!(
        reloaded.resolve("peace", "Any").action(),
        Some(&ActionSpec::Hotkey("ctrl+v".into()))
    );
}

#[test]
fn test_paused_loop_ignores_held_gesture() {
    let store = store_with(&[(GLOBAL, "fist", 1.0, ActionSpec::Wait(0))]);
    let mut h = harness(store, RecordingActuator::new((1000, 800)), Box::new(StaticContext::global()));

    let handle = h.control.handle();
    handle.send(LoopCommand::Pause);
    h.control.drain_commands();
    assert!(h.control.is_paused());

    hold(&mut h.control, 1.0, 0, 1_000);
    assert_eq!(h.control.stats().fires, 0);

    handle.send(LoopCommand::Resume);
    h.control.drain_commands();
    hold(&mut h.control, 1.0, 1_100, 1_700);
    assert_eq!(h.control.stats().fires, 1);
}
