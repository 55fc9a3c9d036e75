// SPDX-License-Identifier: MPL-2.0

//! Audio input discovery
//!
//! A microphone counts as available when PipeWire reports an `Audio/Source`
//! node. Systems without `pw-dump` fall back to the GStreamer device monitor.

use super::{node_props, prop_string, pw_dump};
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, warn};

/// Represents an audio input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    pub name: String,
    pub serial: String,
    pub node_name: String,
}

/// Enumerate available audio input devices
pub fn enumerate_audio_devices() -> Vec<AudioDevice> {
    match pw_dump() {
        Some(nodes) => parse_audio_sources(&nodes),
        None => enumerate_with_device_monitor(),
    }
}

/// Whether at least one microphone can be recorded from
pub fn microphone_available() -> bool {
    let devices = enumerate_audio_devices();
    debug!(count = devices.len(), "Audio sources found");
    !devices.is_empty()
}

/// Collect `Audio/Source` nodes from pw-dump output
pub fn parse_audio_sources(nodes: &[serde_json::Value]) -> Vec<AudioDevice> {
    nodes
        .iter()
        .filter_map(|node| node_props(node, "Audio/Source"))
        .map(|props| AudioDevice {
            name: prop_string(props, "node.nick")
                .or_else(|| prop_string(props, "node.description"))
                .or_else(|| prop_string(props, "node.name"))
                .unwrap_or_else(|| "Unknown Audio Device".to_string()),
            serial: prop_string(props, "object.serial").unwrap_or_else(|| "0".to_string()),
            node_name: prop_string(props, "node.name").unwrap_or_default(),
        })
        .collect()
}

fn enumerate_with_device_monitor() -> Vec<AudioDevice> {
    if let Err(e) = gst::init() {
        warn!("GStreamer init failed: {}", e);
        return Vec::new();
    }

    let monitor = gst::DeviceMonitor::new();
    monitor.add_filter(Some("Audio/Source"), None);
    if let Err(e) = monitor.start() {
        warn!("Failed to start audio device monitor: {}", e);
        return Vec::new();
    }

    let devices = monitor
        .devices()
        .into_iter()
        .map(|device| {
            let name = device.display_name().to_string();
            AudioDevice {
                node_name: name.clone(),
                name,
                serial: String::new(),
            }
        })
        .collect();
    monitor.stop();
    devices
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_audio_sources_are_listed() {
        let nodes = vec![
            json!({"info": {"props": {
                "media.class": "Audio/Source",
                "node.nick": "Built-in Mic",
                "node.name": "alsa_input.pci",
                "object.serial": 42
            }}}),
            json!({"info": {"props": {
                "media.class": "Audio/Sink",
                "node.name": "alsa_output.pci"
            }}}),
            json!({"type": "PipeWire:Interface:Metadata"}),
        ];

        let devices = parse_audio_sources(&nodes);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Built-in Mic");
        assert_eq!(devices[0].serial, "42");
        assert_eq!(devices[0].node_name, "alsa_input.pci");
    }
}
