// SPDX-License-Identifier: MPL-2.0

//! Platform backends: cameras, audio inputs and capability grants

pub mod audio;
pub mod camera;
pub mod permissions;

use std::process::Command;
use tracing::warn;

/// Run `pw-dump` and return the PipeWire object list
pub(crate) fn pw_dump() -> Option<Vec<serde_json::Value>> {
    let output = match Command::new("pw-dump").output() {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run pw-dump: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        warn!("pw-dump command failed");
        return None;
    }

    match serde_json::from_slice(&output.stdout) {
        Ok(nodes) => Some(nodes),
        Err(e) => {
            warn!("Failed to parse JSON from pw-dump: {}", e);
            None
        }
    }
}

/// Properties of a PipeWire node if its media class matches
pub(crate) fn node_props<'a>(
    node: &'a serde_json::Value,
    media_class: &str,
) -> Option<&'a serde_json::Value> {
    let props = node.get("info")?.get("props")?;
    (props.get("media.class")?.as_str()? == media_class).then_some(props)
}

/// Read a property that pw-dump may emit either as a string or a number
pub(crate) fn prop_string(props: &serde_json::Value, key: &str) -> Option<String> {
    let value = props.get(key)?;
    value
        .as_str()
        .map(str::to_string)
        .or_else(|| value.as_u64().map(|n| n.to_string()))
}
