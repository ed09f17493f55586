//! Profile Store
//!
//! In-memory owner of gesture templates, per-context action profiles, and
//! engine settings, persisted as a single JSON document:
//!
//! ```json
//! {
//!   "profiles": { "GLOBAL": { "actions": { "fist": "hotkey:ctrl+c" } } },
//!   "gestures": { "fist": [[0.0, 0.0], [0.12, -0.4]] },
//!   "settings": { "hold_time": 0.5, "threshold": 0.07 }
//! }
//! ```
//!
//! Loading is lenient. Action strings that do not decode and template entries
//! that are not point lists are logged and skipped, and a document that cannot
//! be read at all yields an empty store. `GLOBAL` is always present.

use super::action::ActionSpec;
use crate::perception::Point2;
use crate::recognition::GestureTemplate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The fallback profile scope
pub const GLOBAL: &str = "GLOBAL";

/// Longest accepted hold time, in seconds
pub const MAX_HOLD_TIME: f64 = 60.0;

/// Engine settings persisted alongside profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hold-to-confirm time in seconds
    pub hold_time: f64,
    /// Classifier rejection threshold
    pub threshold: f64,
    /// Capture rectangle inset in frame pixels (absolute pointer mode)
    pub frame_reduction: u32,
    /// Relative pointer gain
    pub trackpad_sensitivity: f64,
    /// Use relative (trackpad) pointer mode instead of absolute
    pub trackpad_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hold_time: 0.5,
            threshold: 0.07,
            frame_reduction: 100,
            trackpad_sensitivity: 3.0,
            trackpad_mode: false,
        }
    }
}

impl Settings {
    pub const KEYS: [&'static str; 5] = [
        "hold_time",
        "threshold",
        "frame_reduction",
        "trackpad_sensitivity",
        "trackpad_mode",
    ];

    /// Hold time as a `Duration`, clamped to `[0, MAX_HOLD_TIME]`.
    pub fn hold_duration(&self) -> Duration {
        let secs = if self.hold_time.is_finite() {
            self.hold_time.clamp(0.0, MAX_HOLD_TIME)
        } else {
            Settings::default().hold_time
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    /// Bring out-of-range values from a hand-edited document back into range.
    fn sanitized(mut self) -> Self {
        let defaults = Settings::default();
        if !self.hold_time.is_finite() || !(0.0..=MAX_HOLD_TIME).contains(&self.hold_time) {
            let clamped = if self.hold_time.is_finite() {
                self.hold_time.clamp(0.0, MAX_HOLD_TIME)
            } else {
                defaults.hold_time
            };
            warn!(hold_time = self.hold_time, clamped, "hold_time out of range");
            self.hold_time = clamped;
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            warn!(threshold = self.threshold, "Invalid threshold, using default");
            self.threshold = defaults.threshold;
        }
        if !self.trackpad_sensitivity.is_finite() || self.trackpad_sensitivity <= 0.0 {
            warn!(sensitivity = self.trackpad_sensitivity, "Invalid trackpad_sensitivity, using default");
            self.trackpad_sensitivity = defaults.trackpad_sensitivity;
        }
        self
    }

    /// Set one setting from its textual value.
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let bad = |reason: &str| crate::Error::Profile(format!("{} = '{}': {}", key, value, reason));
        let parse_f64 = |value: &str| -> crate::Result<f64> {
            let v: f64 = value.trim().parse().map_err(|_| bad("not a number"))?;
            if !v.is_finite() {
                return Err(bad("not a finite number"));
            }
            Ok(v)
        };

        match key {
            "hold_time" => {
                let v = parse_f64(value)?;
                if !(0.0..=MAX_HOLD_TIME).contains(&v) {
                    return Err(bad(&format!("must be between 0 and {}", MAX_HOLD_TIME)));
                }
                self.hold_time = v;
            }
            "threshold" => {
                let v = parse_f64(value)?;
                if v <= 0.0 {
                    return Err(bad("must be > 0"));
                }
                self.threshold = v;
            }
            "frame_reduction" => {
                self.frame_reduction = value.trim().parse().map_err(|_| bad("not a pixel count"))?;
            }
            "trackpad_sensitivity" => {
                let v = parse_f64(value)?;
                if v <= 0.0 {
                    return Err(bad("must be > 0"));
                }
                self.trackpad_sensitivity = v;
            }
            "trackpad_mode" => {
                self.trackpad_mode = match value.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "on" | "yes" => true,
                    "false" | "0" | "off" | "no" => false,
                    _ => return Err(bad("expected true or false")),
                };
            }
            _ => {
                return Err(crate::Error::Profile(format!(
                    "unknown setting '{}' (expected one of: {})",
                    key,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

/// One scope's gesture → action mappings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    actions: BTreeMap<String, ActionSpec>,
}

impl Profile {
    pub fn get(&self, gesture: &str) -> Option<&ActionSpec> {
        self.actions.get(gesture)
    }

    pub fn contains(&self, gesture: &str) -> bool {
        self.actions.contains_key(gesture)
    }

    pub fn actions(&self) -> impl Iterator<Item = (&str, &ActionSpec)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Result of deleting a gesture from a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    /// A mapping existed in the scope and was removed
    pub mapping_removed: bool,
    /// No scope referenced the gesture any more, so its template was dropped
    pub template_removed: bool,
}

/// Gesture templates, profiles, and settings
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: Option<PathBuf>,
    profiles: BTreeMap<String, Profile>,
    templates: Vec<GestureTemplate>,
    settings: Settings,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore {
    /// Empty in-memory store containing only `GLOBAL`
    pub fn new() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(GLOBAL.to_string(), Profile::default());
        Self {
            path: None,
            profiles,
            templates: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Empty store that saves to `path`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new()
        }
    }

    /// Load a store document, failing on I/O or syntax errors.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut store = Self::from_json(&content)?;
        store.path = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            templates = store.templates.len(),
            profiles = store.profiles.len(),
            "Loaded profile store"
        );
        Ok(store)
    }

    /// Open a store for offline editing.
    ///
    /// A missing file is created with default contents. Unlike
    /// [`ProfileStore::load_or_default`], an existing file that fails to
    /// decode is an error, so an edit never replaces it with an empty store.
    pub fn open(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let store = Self::with_path(path);
        store.save()?;
        Ok(store)
    }

    /// Load a store document, never failing.
    ///
    /// A missing file is created with default contents. An unreadable or
    /// malformed file is left untouched and an empty store is returned; the
    /// next save overwrites it.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            let store = Self::with_path(path);
            if let Err(e) = store.save() {
                warn!(path = %path.display(), error = %e, "Could not create profile store");
            }
            return store;
        }

        match Self::load(path) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Profile store unreadable, starting empty");
                Self::with_path(path)
            }
        }
    }

    /// Decode a store document.
    pub fn from_json(content: &str) -> crate::Result<Self> {
        let document: StoreDocument = serde_json::from_str(content)?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: StoreDocument) -> Self {
        let mut store = Self::new();
        store.templates = document.gestures.0;
        store.settings = document.settings;

        for (scope, value) in document.profiles {
            let Some(actions) = value.get("actions").and_then(|a| a.as_object()) else {
                warn!(scope = %scope, "Profile has no actions table, skipping");
                continue;
            };
            let profile = store.profiles.entry(scope.clone()).or_default();
            for (gesture, encoded) in actions {
                let Some(encoded) = encoded.as_str() else {
                    warn!(scope = %scope, gesture = %gesture, "Action is not a string, skipping");
                    continue;
                };
                if encoded.trim().is_empty() {
                    continue;
                }
                match encoded.parse::<ActionSpec>() {
                    Ok(action) => {
                        profile.actions.insert(gesture.clone(), action);
                    }
                    Err(e) => {
                        warn!(scope = %scope, gesture = %gesture, error = %e, "Skipping undecodable action");
                    }
                }
            }
        }
        store
    }

    /// Encode the store document.
    pub fn to_json(&self) -> crate::Result<String> {
        let document = StoreDocumentRef {
            profiles: self
                .profiles
                .iter()
                .map(|(scope, profile)| {
                    let actions = profile
                        .actions
                        .iter()
                        .map(|(g, a)| (g.as_str(), a.to_string()))
                        .collect();
                    (scope.as_str(), ProfileDocumentRef { actions })
                })
                .collect(),
            gestures: TemplatesRef(&self.templates),
            settings: &self.settings,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Persist to the backing file.
    pub fn save(&self) -> crate::Result<()> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Err(crate::Error::Profile(
                "profile store has no backing file".to_string(),
            )),
        }
    }

    /// Persist to `path` by writing `<path>.tmp` and renaming it over the
    /// destination.
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;
        debug!(path = %path.display(), "Saved profile store");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Templates in registration order
    pub fn templates(&self) -> &[GestureTemplate] {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&GestureTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn profile(&self, scope: &str) -> Option<&Profile> {
        self.profiles.get(scope)
    }

    pub fn profiles(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Change one setting from its textual value.
    pub fn save_setting(&mut self, key: &str, value: &str) -> crate::Result<()> {
        self.settings.set(key, value)
    }

    /// Register or replace a template.
    ///
    /// Re-registering an existing name replaces its points in place, keeping
    /// its position. All templates must share one point count.
    pub fn register_gesture(&mut self, template: GestureTemplate) -> crate::Result<()> {
        let name = template.name.trim();
        if name.is_empty() {
            return Err(crate::Error::Profile("gesture name must not be empty".to_string()));
        }
        if template.is_empty() {
            return Err(crate::Error::Profile(format!("gesture '{}' has no points", name)));
        }
        if let Some(other) = self
            .templates
            .iter()
            .find(|t| t.name != name && t.len() != template.len())
        {
            return Err(crate::Error::Profile(format!(
                "gesture '{}' has {} points but '{}' has {}",
                name,
                template.len(),
                other.name,
                other.len()
            )));
        }

        let template = GestureTemplate::new(name, template.points);
        match self.templates.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => {
                info!(gesture = %template.name, "Replaced gesture template");
                *existing = template;
            }
            None => {
                info!(gesture = %template.name, "Registered gesture template");
                self.templates.push(template);
            }
        }
        Ok(())
    }

    /// Map `gesture` to `action` in `scope`, creating the scope if needed.
    pub fn set_action(&mut self, scope: &str, gesture: &str, action: ActionSpec) -> crate::Result<()> {
        if self.template(gesture).is_none() {
            return Err(crate::Error::Profile(format!("unknown gesture '{}'", gesture)));
        }
        let scope = scope.trim();
        if scope.is_empty() {
            return Err(crate::Error::Profile("scope must not be empty".to_string()));
        }
        info!(scope = %scope, gesture = %gesture, action = %action, "Mapped gesture");
        self.profiles
            .entry(scope.to_string())
            .or_default()
            .actions
            .insert(gesture.to_string(), action);
        Ok(())
    }

    /// Remove one mapping. Returns whether it existed.
    pub fn remove_action(&mut self, scope: &str, gesture: &str) -> bool {
        self.profiles
            .get_mut(scope)
            .map(|p| p.actions.remove(gesture).is_some())
            .unwrap_or(false)
    }

    /// Remove the gesture's mapping in `scope`, then drop its template if no
    /// scope still maps it.
    pub fn delete_gesture(&mut self, name: &str, scope: &str) -> DeleteOutcome {
        let mapping_removed = self.remove_action(scope, name);
        let in_use = self.profiles.values().any(|p| p.contains(name));

        let mut template_removed = false;
        if !in_use {
            let before = self.templates.len();
            self.templates.retain(|t| t.name != name);
            template_removed = self.templates.len() != before;
        }

        info!(
            gesture = %name,
            scope = %scope,
            mapping_removed,
            template_removed,
            "Deleted gesture"
        );
        DeleteOutcome {
            mapping_removed,
            template_removed,
        }
    }

    /// Remove a whole context scope. `GLOBAL` cannot be removed.
    pub fn delete_profile(&mut self, scope: &str) -> crate::Result<bool> {
        if scope == GLOBAL {
            return Err(crate::Error::Profile("the GLOBAL profile cannot be deleted".to_string()));
        }
        Ok(self.profiles.remove(scope).is_some())
    }
}

#[derive(Deserialize, Default)]
struct StoreDocument {
    #[serde(default)]
    profiles: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    gestures: OrderedTemplates,
    #[serde(default, deserialize_with = "lenient_settings")]
    settings: Settings,
}

#[derive(Serialize)]
struct StoreDocumentRef<'a> {
    profiles: BTreeMap<&'a str, ProfileDocumentRef<'a>>,
    gestures: TemplatesRef<'a>,
    settings: &'a Settings,
}

#[derive(Serialize)]
struct ProfileDocumentRef<'a> {
    actions: BTreeMap<&'a str, String>,
}

fn lenient_settings<'de, D>(deserializer: D) -> Result<Settings, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<Settings>(value)
        .map(Settings::sanitized)
        .unwrap_or_else(|e| {
            warn!(error = %e, "Invalid settings, using defaults");
            Settings::default()
        }))
}

/// `{name: [[x, y], ...]}` read in document order
#[derive(Default)]
struct OrderedTemplates(Vec<GestureTemplate>);

impl<'de> Deserialize<'de> for OrderedTemplates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TemplatesVisitor;

        impl<'de> Visitor<'de> for TemplatesVisitor {
            type Value = OrderedTemplates;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of gesture names to point lists")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut templates: Vec<GestureTemplate> = Vec::new();
                while let Some((name, value)) = map.next_entry::<String, serde_json::Value>()? {
                    let points: Vec<Point2> = match serde_json::from_value(value) {
                        Ok(points) => points,
                        Err(e) => {
                            warn!(gesture = %name, error = %e, "Skipping malformed gesture template");
                            continue;
                        }
                    };
                    let template = GestureTemplate::new(name, points);
                    match templates.iter_mut().find(|t| t.name == template.name) {
                        Some(existing) => *existing = template,
                        None => templates.push(template),
                    }
                }
                Ok(OrderedTemplates(templates))
            }
        }

        deserializer.deserialize_map(TemplatesVisitor)
    }
}

struct TemplatesRef<'a>(&'a [GestureTemplate]);

impl Serialize for TemplatesRef<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for template in self.0 {
            map.serialize_entry(&template.name, &template.points)?;
        }
        map.end()
    }
}
