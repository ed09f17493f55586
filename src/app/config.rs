//! Configuration Management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Pose estimator and frame settings
    #[serde(default)]
    pub perception: PerceptionConfig,
    /// Profile store location
    #[serde(default)]
    pub store: StoreConfig,
    /// Action execution timing
    #[serde(default)]
    pub executor: ExecutorConfig,
    /// Pointer mode tunables
    #[serde(default)]
    pub pointer: PointerConfig,
    /// Active context detection
    #[serde(default)]
    pub context: ContextConfig,
}

/// Perception configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Sidecar estimator command line (program followed by arguments)
    pub command: Vec<String>,
    /// Keypoints per hand
    pub landmark_count: usize,
    /// Camera frame width (pixels)
    pub frame_width: u32,
    /// Camera frame height (pixels)
    pub frame_height: u32,
    /// Mirror frames horizontally
    pub mirror: bool,
    /// Line the sidecar prints once it is ready (empty = no handshake)
    pub ready_line: String,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Profile store JSON path (default: ~/.gesture_control/profiles.json)
    pub profiles_path: Option<PathBuf>,
}

/// Executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Upper bound for a single wait step (ms)
    pub max_wait_ms: u64,
    /// Delay before pressing a hotkey (ms)
    pub key_settle_ms: u64,
    /// Delay between clipboard write and paste (ms)
    pub clipboard_settle_ms: u64,
}

/// Pointer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Absolute-mode smoothing factor in (0, 1]
    pub smoothing: f64,
    /// Thumb-above-knuckle margin for absolute drag (normalized)
    pub drag_margin: f64,
    /// Thumb-to-index distance for relative drag (normalized)
    pub pinch_threshold: f64,
    /// Screen width override (pixels)
    pub screen_width: Option<u32>,
    /// Screen height override (pixels)
    pub screen_height: Option<u32>,
}

/// Context configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// "static" or "frontmost"
    pub provider: String,
    /// Context reported by the static provider, and the frontmost fallback
    pub static_context: String,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            command: vec!["python3".to_string(), "hand_tracker.py".to_string()],
            landmark_count: 21,
            frame_width: 640,
            frame_height: 480,
            mirror: true,
            ready_line: "READY".to_string(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: 5_000,
            key_settle_ms: 100,
            clipboard_settle_ms: 100,
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.2,
            drag_margin: 0.02,
            pinch_threshold: 0.05,
            screen_width: None,
            screen_height: None,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            provider: "static".to_string(),
            static_context: crate::profile::GLOBAL.to_string(),
        }
    }
}

impl StoreConfig {
    /// Resolved profile store path
    pub fn profiles_path(&self) -> PathBuf {
        self.profiles_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".gesture_control").join("profiles.json"))
                .unwrap_or_else(|| PathBuf::from("profiles.json"))
        })
    }
}

impl PointerConfig {
    /// Screen size override, if both dimensions are set
    pub fn screen_override(&self) -> Option<(u32, u32)> {
        match (self.screen_width, self.screen_height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.perception.landmark_count <= crate::perception::INDEX_TIP {
            return Err(crate::Error::Config(format!(
                "landmark_count must be > {}, got {}",
                crate::perception::INDEX_TIP,
                self.perception.landmark_count
            )));
        }
        if self.perception.frame_width == 0 || self.perception.frame_height == 0 {
            return Err(crate::Error::Config(format!(
                "frame size must be non-zero, got {}x{}",
                self.perception.frame_width, self.perception.frame_height
            )));
        }
        if self.executor.max_wait_ms > 60_000 {
            return Err(crate::Error::Config(format!(
                "max_wait_ms must be <= 60000, got {}", self.executor.max_wait_ms
            )));
        }
        if self.executor.key_settle_ms > 5_000 || self.executor.clipboard_settle_ms > 5_000 {
            return Err(crate::Error::Config(
                "settle delays must be <= 5000 ms".to_string(),
            ));
        }
        if !(self.pointer.smoothing > 0.0 && self.pointer.smoothing <= 1.0) {
            return Err(crate::Error::Config(format!(
                "smoothing must be in (0, 1], got {}", self.pointer.smoothing
            )));
        }
        if !(0.0..=1.0).contains(&self.pointer.drag_margin) {
            return Err(crate::Error::Config(format!(
                "drag_margin must be in [0, 1], got {}", self.pointer.drag_margin
            )));
        }
        if !(self.pointer.pinch_threshold > 0.0 && self.pointer.pinch_threshold <= 1.0) {
            return Err(crate::Error::Config(format!(
                "pinch_threshold must be in (0, 1], got {}", self.pointer.pinch_threshold
            )));
        }
        if self.pointer.screen_width == Some(0) || self.pointer.screen_height == Some(0) {
            return Err(crate::Error::Config("screen size override must be non-zero".to_string()));
        }
        if !matches!(self.context.provider.as_str(), "static" | "frontmost") {
            return Err(crate::Error::Config(format!(
                "context provider must be 'static' or 'frontmost', got '{}'", self.context.provider
            )));
        }
        if self.context.static_context.trim().is_empty() {
            return Err(crate::Error::Config("static_context must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gesture_control").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
