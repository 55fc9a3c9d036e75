// SPDX-License-Identifier: GPL-3.0-only

//! Camera discovery
//!
//! PipeWire is asked first through `pw-dump`; its libcamera nodes carry a
//! location property that tells front from back. Without PipeWire the V4L2
//! device nodes are scanned instead. The virtual backend returns two test
//! pattern sources so the whole screen works without hardware.

use super::types::{
    CameraBackendType, CameraDevice, CameraFacing, DeviceSource, assign_facings,
    facing_from_location, facing_from_name,
};
use crate::backends::{node_props, prop_string, pw_dump};
use tracing::{debug, info, warn};

/// Enumerate cameras for the configured backend with facings assigned
pub fn enumerate_cameras(backend: CameraBackendType) -> Vec<CameraDevice> {
    let mut devices = match backend {
        CameraBackendType::PipeWire => enumerate_pipewire_cameras()
            .filter(|cams| !cams.is_empty())
            .unwrap_or_else(|| {
                info!("No PipeWire cameras, falling back to V4L2 enumeration");
                enumerate_v4l2_cameras()
            }),
        CameraBackendType::V4l2 => enumerate_v4l2_cameras(),
        CameraBackendType::Virtual => virtual_cameras(),
    };

    assign_facings(&mut devices);
    info!(backend = %backend, count = devices.len(), "Cameras enumerated");
    devices
}

/// Enumerate `Video/Source` nodes known to PipeWire
pub fn enumerate_pipewire_cameras() -> Option<Vec<CameraDevice>> {
    debug!("Attempting to enumerate cameras via PipeWire");
    pw_dump().map(|nodes| parse_pipewire_cameras(&nodes))
}

/// Extract cameras from pw-dump output
pub fn parse_pipewire_cameras(nodes: &[serde_json::Value]) -> Vec<CameraDevice> {
    nodes
        .iter()
        .filter_map(|node| node_props(node, "Video/Source"))
        .filter_map(|props| {
            let serial = prop_string(props, "object.serial")?;
            let name = prop_string(props, "node.description")
                .or_else(|| prop_string(props, "node.nick"))
                .or_else(|| prop_string(props, "node.name"))
                .unwrap_or_else(|| format!("Camera {}", serial));

            let facing = prop_string(props, "api.libcamera.location")
                .and_then(|loc| facing_from_location(&loc))
                .or_else(|| facing_from_name(&name));

            debug!(serial = %serial, name = %name, facing = ?facing, "Found PipeWire camera");
            Some(CameraDevice {
                name,
                source: DeviceSource::PipeWire { serial },
                facing,
            })
        })
        .collect()
}

/// Enumerate V4L2 capture devices
pub fn enumerate_v4l2_cameras() -> Vec<CameraDevice> {
    let mut devices = Vec::new();

    for node in v4l::context::enum_devices() {
        let path = node.path().to_string_lossy().to_string();

        let caps = match v4l::Device::with_path(node.path()).and_then(|dev| dev.query_caps()) {
            Ok(caps) => caps,
            Err(e) => {
                debug!(path = %path, error = %e, "Skipping unreadable V4L2 node");
                continue;
            }
        };

        // Metadata nodes share the card name but cannot stream frames
        if !caps
            .capabilities
            .contains(v4l::capability::Flags::VIDEO_CAPTURE)
        {
            continue;
        }

        let name = node.name().unwrap_or_else(|| caps.card.clone());
        let facing = facing_from_name(&name);
        debug!(path = %path, name = %name, facing = ?facing, "Found V4L2 camera");
        devices.push(CameraDevice {
            name,
            source: DeviceSource::V4l2 { path },
            facing,
        });
    }

    if devices.is_empty() {
        warn!("No V4L2 capture devices found");
    }
    devices
}

/// Test pattern cameras for the virtual backend
pub fn virtual_cameras() -> Vec<CameraDevice> {
    vec![
        CameraDevice {
            name: "Virtual Back Camera".to_string(),
            source: DeviceSource::TestPattern {
                pattern: "ball".to_string(),
            },
            facing: Some(CameraFacing::Back),
        },
        CameraDevice {
            name: "Virtual Front Camera".to_string(),
            source: DeviceSource::TestPattern {
                pattern: "smpte".to_string(),
            },
            facing: Some(CameraFacing::Front),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pipewire_location_sets_facing() {
        let nodes = vec![
            json!({"info": {"props": {
                "media.class": "Video/Source",
                "node.description": "imx519",
                "object.serial": 71,
                "api.libcamera.location": "back"
            }}}),
            json!({"info": {"props": {
                "media.class": "Video/Source",
                "node.description": "ov5693",
                "object.serial": "72",
                "api.libcamera.location": "front"
            }}}),
        ];

        let cameras = parse_pipewire_cameras(&nodes);
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].facing, Some(CameraFacing::Back));
        assert_eq!(
            cameras[0].source,
            DeviceSource::PipeWire {
                serial: "71".to_string()
            }
        );
        assert_eq!(cameras[1].facing, Some(CameraFacing::Front));
    }

    #[test]
    fn nodes_without_serial_are_skipped() {
        let nodes = vec![json!({"info": {"props": {
            "media.class": "Video/Source",
            "node.description": "Broken"
        }}})];
        assert!(parse_pipewire_cameras(&nodes).is_empty());
    }

    #[test]
    fn virtual_backend_has_both_facings() {
        let cameras = virtual_cameras();
        assert!(cameras.iter().any(|c| c.serves(CameraFacing::Front)));
        assert!(cameras.iter().any(|c| c.serves(CameraFacing::Back)));
        assert!(cameras.iter().all(|c| c.source.is_virtual()));
    }
}
