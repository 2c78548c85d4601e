//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{TrackcutError, TrackcutResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Render/upload backend connection settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Timeline interaction settings.
    #[serde(default)]
    pub editor: EditorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the external render and asset service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the backend (e.g. `http://localhost:8000`).
    pub base_url: String,

    /// Per-request timeout in seconds. Renders can be slow.
    pub timeout_secs: u64,
}

/// Timeline interaction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Horizontal timeline scale.
    pub pixels_per_second: f64,

    /// Magnetic snap distance in screen pixels.
    pub snap_threshold_px: f64,

    /// Tolerance for floating point interval comparisons (seconds).
    pub overlap_epsilon: f64,

    /// Quiet period before a preview render is requested.
    pub preview_debounce_ms: u64,

    /// Local directory the backend serves `/uploads` from.
    pub media_root: String,

    /// Number of freestanding audio tracks created with a new project.
    pub audio_tracks: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trackcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            editor: EditorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: 20.0,
            snap_threshold_px: 15.0,
            overlap_epsilon: 0.001,
            preview_debounce_ms: 1000,
            media_root: "media".to_string(),
            audio_tracks: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EditorConfig {
    /// Snap threshold expressed in timeline seconds.
    pub fn snap_threshold_secs(&self) -> f64 {
        self.snap_threshold_px / self.pixels_per_second
    }

    /// Convert a horizontal pointer displacement to a timeline delta.
    pub fn pixels_to_secs(&self, px: f64) -> f64 {
        px / self.pixels_per_second
    }

    /// Quiet period before an auto-preview fires.
    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    /// Reject settings that would make the interaction math meaningless.
    pub fn validate(&self) -> TrackcutResult<()> {
        if !(self.pixels_per_second > 0.0) {
            return Err(TrackcutError::config("pixels_per_second must be positive"));
        }
        if self.snap_threshold_px < 0.0 {
            return Err(TrackcutError::config("snap_threshold_px must not be negative"));
        }
        if self.overlap_epsilon < 0.0 {
            return Err(TrackcutError::config("overlap_epsilon must not be negative"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> TrackcutResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.editor.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("trackcut").join("config.json")
}
