// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};

/// Which physical camera is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraFacing {
    /// User-facing camera
    Front,
    /// World-facing camera
    #[default]
    Back,
}

impl CameraFacing {
    pub fn opposite(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
        }
    }
}

/// Camera backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CameraBackendType {
    /// PipeWire backend (modern Linux standard), falls back to V4L2 enumeration
    #[default]
    PipeWire,
    /// Direct V4L2 device nodes
    V4l2,
    /// GStreamer test sources, no hardware needed
    Virtual,
}

impl std::fmt::Display for CameraBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraBackendType::PipeWire => write!(f, "PipeWire"),
            CameraBackendType::V4l2 => write!(f, "V4L2"),
            CameraBackendType::Virtual => write!(f, "Virtual"),
        }
    }
}

/// Where a camera's frames come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSource {
    /// PipeWire node, addressed by object serial
    PipeWire { serial: String },
    /// V4L2 device node such as /dev/video0
    V4l2 { path: String },
    /// GStreamer `videotestsrc` pattern
    TestPattern { pattern: String },
}

impl DeviceSource {
    /// GStreamer launch fragment for the video source element
    pub fn video_source_description(&self) -> String {
        match self {
            DeviceSource::PipeWire { serial } => {
                format!("pipewiresrc target-object={} do-timestamp=true", serial)
            }
            DeviceSource::V4l2 { path } => format!("v4l2src device=\"{}\"", path),
            DeviceSource::TestPattern { pattern } => {
                format!("videotestsrc is-live=true pattern={}", pattern)
            }
        }
    }

    /// GStreamer launch fragment for the matching audio source element
    pub fn audio_source_description(&self) -> &'static str {
        match self {
            DeviceSource::TestPattern { .. } => "audiotestsrc is-live=true wave=ticks",
            DeviceSource::PipeWire { .. } | DeviceSource::V4l2 { .. } => "autoaudiosrc",
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, DeviceSource::TestPattern { .. })
    }
}

impl std::fmt::Display for DeviceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceSource::PipeWire { serial } => write!(f, "pipewire-serial-{}", serial),
            DeviceSource::V4l2 { path } => write!(f, "{}", path),
            DeviceSource::TestPattern { pattern } => write!(f, "test-pattern-{}", pattern),
        }
    }
}

/// A camera the engine can capture from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    pub source: DeviceSource,
    /// None when the hardware does not report a location and no role was left to assign
    pub facing: Option<CameraFacing>,
}

impl CameraDevice {
    pub fn serves(&self, facing: CameraFacing) -> bool {
        self.facing == Some(facing)
    }
}

/// Parse a camera location property ("front", "back", "external")
pub fn facing_from_location(location: &str) -> Option<CameraFacing> {
    match location.trim().to_lowercase().as_str() {
        "front" => Some(CameraFacing::Front),
        "back" | "rear" => Some(CameraFacing::Back),
        _ => None,
    }
}

/// Guess facing from a device name when no location is reported
pub fn facing_from_name(name: &str) -> Option<CameraFacing> {
    let name = name.to_lowercase();
    if name.contains("front") || name.contains("user") {
        Some(CameraFacing::Front)
    } else if name.contains("rear") || name.contains("back") || name.contains("world") {
        Some(CameraFacing::Back)
    } else {
        None
    }
}

/// Give cameras without a reported location the roles nobody else fills
///
/// Desktop webcams rarely report a location, so the first unassigned camera
/// becomes the back camera if none exists, the next one the front camera.
pub fn assign_facings(devices: &mut [CameraDevice]) {
    for facing in [CameraFacing::Back, CameraFacing::Front] {
        if devices.iter().any(|d| d.serves(facing)) {
            continue;
        }
        if let Some(device) = devices.iter_mut().find(|d| d.facing.is_none()) {
            device.facing = Some(facing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, facing: Option<CameraFacing>) -> CameraDevice {
        CameraDevice {
            name: name.to_string(),
            source: DeviceSource::V4l2 {
                path: format!("/dev/{}", name),
            },
            facing,
        }
    }

    #[test]
    fn single_webcam_becomes_back_camera() {
        let mut devices = vec![device("video0", None)];
        assign_facings(&mut devices);
        assert_eq!(devices[0].facing, Some(CameraFacing::Back));
    }

    #[test]
    fn unknown_camera_fills_missing_role() {
        let mut devices = vec![
            device("video0", None),
            device("video2", Some(CameraFacing::Back)),
        ];
        assign_facings(&mut devices);
        assert_eq!(devices[0].facing, Some(CameraFacing::Front));
        assert_eq!(devices[1].facing, Some(CameraFacing::Back));
    }

    #[test]
    fn extra_cameras_stay_unassigned() {
        let mut devices = vec![
            device("video0", Some(CameraFacing::Front)),
            device("video2", Some(CameraFacing::Back)),
            device("video4", None),
        ];
        assign_facings(&mut devices);
        assert_eq!(devices[2].facing, None);
    }

    #[test]
    fn location_parsing() {
        assert_eq!(facing_from_location("front"), Some(CameraFacing::Front));
        assert_eq!(facing_from_location("Back"), Some(CameraFacing::Back));
        assert_eq!(facing_from_location("external"), None);
        assert_eq!(facing_from_name("Integrated Rear Camera"), Some(CameraFacing::Back));
        assert_eq!(facing_from_name("HD Webcam"), None);
    }
}
