// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};

/// Application name, used for config, cache and log locations
pub const APP_NAME: &str = "capture-screen";

/// Folder created inside the user's Pictures and Videos directories
pub const DEFAULT_GALLERY_FOLDER: &str = "Camera";

/// Scheme prefix some engines put in front of local capture paths
pub const FILE_SCHEME: &str = "file://";

/// Video encoder bitrate presets
///
/// Presets trade file size against quality. The actual bitrate depends on
/// the recording resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitratePreset {
    /// Smaller files, reduced quality
    Low,
    /// Balanced quality and file size
    #[default]
    Medium,
    /// Larger files, better quality
    High,
}

impl BitratePreset {
    pub const ALL: [BitratePreset; 3] = [
        BitratePreset::Low,
        BitratePreset::Medium,
        BitratePreset::High,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            BitratePreset::Low => "Low",
            BitratePreset::Medium => "Medium",
            BitratePreset::High => "High",
        }
    }

    /// Get bitrate in kbps for a given frame width
    ///
    /// - SD (640x480): Low=1, Medium=2, High=4 Mbps
    /// - HD (1280x720): Low=2.5, Medium=5, High=10 Mbps
    /// - Full HD (1920x1080): Low=4, Medium=8, High=16 Mbps
    /// - 2K (2560x1440): Low=8, Medium=16, High=32 Mbps
    /// - 4K (3840x2160): Low=15, Medium=30, High=50 Mbps
    pub fn bitrate_kbps(&self, width: u32) -> u32 {
        let [low, medium, high] = match get_resolution_tier(width) {
            ResolutionTier::SD => [1_000, 2_000, 4_000],
            ResolutionTier::HD => [2_500, 5_000, 10_000],
            ResolutionTier::FullHD => [4_000, 8_000, 16_000],
            ResolutionTier::TwoK => [8_000, 16_000, 32_000],
            ResolutionTier::FourK => [15_000, 30_000, 50_000],
        };
        match self {
            BitratePreset::Low => low,
            BitratePreset::Medium => medium,
            BitratePreset::High => high,
        }
    }
}

/// Resolution tiers for bitrate calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    SD,
    HD,
    FullHD,
    TwoK,
    FourK,
}

/// Get the resolution tier for a given width
pub fn get_resolution_tier(width: u32) -> ResolutionTier {
    match width {
        w if w >= 3840 => ResolutionTier::FourK,
        w if w >= 2560 => ResolutionTier::TwoK,
        w if w >= 1920 => ResolutionTier::FullHD,
        w if w >= 1280 => ResolutionTier::HD,
        _ => ResolutionTier::SD,
    }
}

/// Capture timing
pub mod timing {
    /// Frames from a freshly opened camera are often dark or unfocused
    pub const PHOTO_WARMUP_MS: u64 = 500;

    /// Upper bound for a single photo request
    pub const PHOTO_TIMEOUT_SECS: u64 = 10;

    /// Upper bound between a stop request and the recording outcome
    pub const STOP_TIMEOUT_SECS: u64 = 10;

    /// How long to watch the bus for immediate errors after starting a pipeline
    pub const PIPELINE_START_CHECK_MS: u64 = 500;

    /// Bus poll interval for watcher threads
    pub const BUS_POLL_INTERVAL_MS: u64 = 100;
}

/// Recording defaults
pub mod recording {
    pub const DEFAULT_WIDTH: u32 = 1280;
    pub const DEFAULT_HEIGHT: u32 = 720;
    pub const DEFAULT_FRAMERATE: u32 = 30;
}

/// File name prefixes for captures
pub mod file_names {
    pub const PHOTO_PREFIX: &str = "IMG";
    pub const VIDEO_PREFIX: &str = "VID";
}

/// Media file formats accepted by the gallery
pub mod file_formats {
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi", "mov"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }

    /// Check if a file extension is a supported video format
    pub fn is_video_extension(ext: &str) -> bool {
        VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}
