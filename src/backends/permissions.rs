// SPDX-License-Identifier: MPL-2.0

//! Capability grants for camera and microphone
//!
//! Inside a Flatpak sandbox camera access goes through the XDG desktop
//! portal (`org.freedesktop.portal.Camera`). Outside a sandbox there is no
//! broker, so access is granted when the camera device can be opened.

use super::audio;
use super::camera::types::{CameraDevice, DeviceSource};
use crate::errors::PermissionError;
use futures::StreamExt;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Whether the process runs inside a Flatpak (or similar) sandbox
pub fn is_sandboxed() -> bool {
    std::path::Path::new("/.flatpak-info").exists() || std::env::var_os("container").is_some()
}

/// Request camera access for the given devices
pub async fn request_camera_access(devices: &[CameraDevice]) -> bool {
    if devices.iter().any(|d| d.source.is_virtual()) {
        return true;
    }

    if is_sandboxed() {
        return match access_camera_via_portal().await {
            Ok(granted) => granted,
            Err(e) => {
                warn!(error = %e, "Camera portal request failed");
                false
            }
        };
    }

    let granted = devices.iter().any(device_accessible);
    debug!(granted, "Camera access checked on device nodes");
    granted
}

/// Request microphone access
///
/// There is no portal for audio capture; a reachable audio source is the grant.
pub async fn request_microphone_access(virtual_only: bool) -> bool {
    if virtual_only {
        return true;
    }
    tokio::task::spawn_blocking(audio::microphone_available)
        .await
        .unwrap_or(false)
}

/// Whether the process can open the device for capture
fn device_accessible(device: &CameraDevice) -> bool {
    match &device.source {
        DeviceSource::V4l2 { path } => std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .is_ok(),
        // PipeWire brokers device access itself
        DeviceSource::PipeWire { .. } | DeviceSource::TestPattern { .. } => true,
    }
}

/// Call `AccessCamera` on the desktop portal and wait for the user's answer
async fn access_camera_via_portal() -> Result<bool, PermissionError> {
    let connection = zbus::Connection::session().await?;

    let camera = zbus::Proxy::new(&connection, PORTAL_DESTINATION, PORTAL_PATH, CAMERA_INTERFACE)
        .await?;

    let present: bool = camera.get_property("IsCameraPresent").await?;
    if !present {
        info!("Portal reports no camera present");
        return Ok(false);
    }

    // Subscribe to the response before calling, the answer may come back immediately
    let token = format!("capture_screen_{}", uuid::Uuid::new_v4().simple());
    let sender = connection
        .unique_name()
        .ok_or_else(|| PermissionError::PortalUnavailable("no unique bus name".to_string()))?
        .as_str()
        .trim_start_matches(':')
        .replace('.', "_");
    let request_path = format!("{}/request/{}/{}", PORTAL_PATH, sender, token);

    let request = zbus::Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        request_path.as_str(),
        REQUEST_INTERFACE,
    )
    .await?;
    let mut responses = request.receive_signal("Response").await?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));
    let handle: OwnedObjectPath = camera.call("AccessCamera", &(options,)).await?;
    debug!(handle = %handle, "Camera access requested");

    let message = responses.next().await.ok_or_else(|| {
        PermissionError::PortalUnavailable("portal closed the request".to_string())
    })?;
    let (response, _results): (u32, HashMap<String, OwnedValue>) =
        message.body().deserialize()?;

    // 0 = granted, 1 = cancelled by user, 2 = other failure
    info!(response, "Camera portal answered");
    Ok(response == 0)
}
