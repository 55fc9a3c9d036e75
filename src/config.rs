// SPDX-License-Identifier: GPL-3.0-only

//! Persistent settings
//!
//! Stored as JSON in `$XDG_CONFIG_HOME/capture-screen/config.json`. Missing
//! fields take their default, so older files keep loading.

use crate::backends::camera::{CameraBackendType, CameraFacing};
use crate::constants::{APP_NAME, BitratePreset, DEFAULT_GALLERY_FOLDER, timing};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera backend to use (PipeWire, V4L2 or virtual test sources)
    pub backend: CameraBackendType,
    /// Camera the screen opens with
    pub initial_facing: CameraFacing,
    /// Folder created under Pictures and Videos for saved captures
    pub gallery_folder: String,
    /// Video encoder bitrate preset (Low, Medium, High)
    pub bitrate_preset: BitratePreset,
    /// How long to wait for a photo before giving up
    pub photo_timeout_secs: u64,
    /// How long to wait for a recording to finish after stop
    pub stop_timeout_secs: u64,
    /// Frames are discarded for this long before a photo is taken
    pub photo_warmup_ms: u64,
    /// Loop the recorded clip in the preview
    pub loop_preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: CameraBackendType::default(),
            initial_facing: CameraFacing::Back,
            gallery_folder: DEFAULT_GALLERY_FOLDER.to_string(),
            bitrate_preset: BitratePreset::default(),
            photo_timeout_secs: timing::PHOTO_TIMEOUT_SECS,
            stop_timeout_secs: timing::STOP_TIMEOUT_SECS,
            photo_warmup_ms: timing::PHOTO_WARMUP_MS,
            loop_preview: true,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            warn!("No config directory, using default settings");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    pub fn photo_timeout(&self) -> Duration {
        Duration::from_secs(self.photo_timeout_secs)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn photo_warmup(&self) -> Duration {
        Duration::from_millis(self.photo_warmup_ms)
    }
}
