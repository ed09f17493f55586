//! Integration tests for profile persistence and resolution
//!
//! These tests exercise the store through the filesystem: create on first
//! use, save/reload, corrupt documents, and the authoring operations the CLI
//! and the control loop perform.

use gesture_control::perception::Point2;
use gesture_control::profile::{ActionSpec, MouseButton, ProfileStore, Resolution, GLOBAL};
use gesture_control::recognition::GestureTemplate;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn make_template(name: &str, lean: f64) -> GestureTemplate {
    let points: Vec<Point2> = (0..21)
        .map(|i| Point2::new(0.4 + i as f64 * 0.01 * lean, 0.9 - i as f64 * 0.02))
        .collect();
    GestureTemplate::capture(name, &points)
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_missing_file_is_created() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("profiles.json");

    let store = ProfileStore::load_or_default(&path);
    assert!(path.exists());
    assert!(store.profile(GLOBAL).is_some());
    assert!(store.templates().is_empty());

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("GLOBAL"));
}

#[test]
fn test_corrupt_file_is_left_alone() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let store = ProfileStore::load_or_default(&path);
    assert!(store.profile(GLOBAL).is_some());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ this is not json");
}

#[test]
fn test_editing_corrupt_file_fails_without_overwrite() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    assert!(ProfileStore::open(&path).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ this is not json");

    // A missing file is still created for editing
    let fresh = temp.path().join("fresh").join("profiles.json");
    let mut store = ProfileStore::open(&fresh).unwrap();
    store.register_gesture(make_template("fist", 1.0)).unwrap();
    store.save().unwrap();
    assert!(ProfileStore::load(&fresh).unwrap().template("fist").is_some());
}

#[test]
fn test_save_and_reload() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");

    let mut store = ProfileStore::with_path(&path);
    store.register_gesture(make_template("fist", 1.0)).unwrap();
    store.register_gesture(make_template("palm", 2.0)).unwrap();
    store
        .set_action(GLOBAL, "fist", "chain:hotkey:ctrl+c|wait:100|paste:done".parse().unwrap())
        .unwrap();
    store
        .set_action("Notepad", "palm", ActionSpec::MouseClick(MouseButton::Double))
        .unwrap();
    store.save_setting("hold_time", "0.8").unwrap();
    store.save().unwrap();
    assert!(!temp.path().join("profiles.json.tmp").exists());

    let reloaded = ProfileStore::load(&path).unwrap();
    assert_eq!(reloaded.templates(), store.templates());
    assert_eq!(reloaded.settings(), store.settings());
    assert_eq!(
        reloaded.resolve("fist", "Anything").action(),
        store.resolve("fist", "Anything").action()
    );
    assert_eq!(
        reloaded.resolve("palm", "Notepad").action(),
        Some(&ActionSpec::MouseClick(MouseButton::Double))
    );

    // Template order survives a round trip
    let names: Vec<&str> = reloaded.templates().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["fist", "palm"]);
}

#[test]
fn test_hand_written_document() {
    let json = r#"{
        "profiles": {
            "GLOBAL": {"actions": {"fist": "hotkey:ctrl+z", "bad": "teleport:home"}},
            "Firefox": {"actions": {"fist": "web:example.com"}}
        },
        "gestures": {
            "fist": [[0.0, 0.0], [0.5, -1.0]]
        },
        "settings": {"threshold": 0.1}
    }"#;

    let store = ProfileStore::from_json(json).unwrap();
    assert_eq!(store.templates().len(), 1);
    assert_eq!(store.settings().threshold, 0.1);
    assert_eq!(store.settings().hold_time, 0.5);
    assert!(!store.profile(GLOBAL).unwrap().contains("bad"));
    assert_eq!(
        store.resolve("fist", "Firefox").action(),
        Some(&ActionSpec::OpenWeb("example.com".into()))
    );
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_context_then_global_resolution() {
    let mut store = ProfileStore::new();
    store.register_gesture(make_template("g1", 1.0)).unwrap();
    store.register_gesture(make_template("g2", 2.0)).unwrap();
    store.set_action("Notepad", "g1", ActionSpec::Hotkey("ctrl+a".into())).unwrap();
    store.set_action(GLOBAL, "g1", ActionSpec::Hotkey("ctrl+b".into())).unwrap();

    assert_eq!(
        store.resolve("g1", "Notepad").action(),
        Some(&ActionSpec::Hotkey("ctrl+a".into()))
    );
    assert_eq!(
        store.resolve("g1", "OtherApp").action(),
        Some(&ActionSpec::Hotkey("ctrl+b".into()))
    );
    assert!(matches!(store.resolve("g2", "Notepad"), Resolution::NoAction));
}

// ============================================================================
// Authoring
// ============================================================================

#[test]
fn test_delete_keeps_template_still_mapped_elsewhere() {
    let mut store = ProfileStore::new();
    store.register_gesture(make_template("fist", 1.0)).unwrap();
    store.set_action(GLOBAL, "fist", ActionSpec::Wait(10)).unwrap();
    store.set_action("Code", "fist", ActionSpec::Wait(20)).unwrap();

    let outcome = store.delete_gesture("fist", "Code");
    assert!(outcome.mapping_removed);
    assert!(!outcome.template_removed);
    assert!(store.template("fist").is_some());

    let outcome = store.delete_gesture("fist", GLOBAL);
    assert!(outcome.mapping_removed);
    assert!(outcome.template_removed);
    assert!(store.template("fist").is_none());
}

#[test]
fn test_mapping_requires_registered_gesture() {
    let mut store = ProfileStore::new();
    assert!(store.set_action(GLOBAL, "ghost", ActionSpec::Wait(1)).is_err());
}

#[test]
fn test_mismatched_point_count_rejected() {
    let mut store = ProfileStore::new();
    store.register_gesture(make_template("fist", 1.0)).unwrap();
    let short = GestureTemplate::new("short", vec![Point2::new(0.0, 0.0); 5]);
    assert!(store.register_gesture(short).is_err());
}

#[test]
fn test_global_profile_cannot_be_deleted() {
    let mut store = ProfileStore::new();
    assert!(store.delete_profile(GLOBAL).is_err());
    assert!(!store.delete_profile("Nope").unwrap());
}
