// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer camera engine
//!
//! Devices are discovered once when the engine is created. Photos and
//! recordings are written to the capture directory; GStreamer work runs on
//! blocking tasks so the controller's event loop never stalls.

use super::enumeration::enumerate_cameras;
use super::{CameraBackendType, CameraDevice, CameraEngine, RecordingSession};
use crate::backends::{audio, permissions};
use crate::config::Config;
use crate::constants::{BitratePreset, file_names, recording};
use crate::errors::CaptureError;
use crate::pipelines::photo::capture_jpeg;
use crate::pipelines::video::{RecordingHandle, VideoRecorder, VideoRecorderConfig};
use crate::storage::capture_file_name;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

pub struct GstCameraEngine {
    backend: CameraBackendType,
    devices: Vec<CameraDevice>,
    capture_dir: PathBuf,
    bitrate_preset: BitratePreset,
    photo_warmup: Duration,
    active: Mutex<Option<RecordingHandle>>,
}

impl GstCameraEngine {
    pub fn new(config: &Config, capture_dir: PathBuf) -> Self {
        let devices = enumerate_cameras(config.backend);
        info!(
            backend = %config.backend,
            count = devices.len(),
            capture_dir = %capture_dir.display(),
            "Camera engine ready"
        );
        Self {
            backend: config.backend,
            devices,
            capture_dir,
            bitrate_preset: config.bitrate_preset,
            photo_warmup: config.photo_warmup(),
            active: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> CameraBackendType {
        self.backend
    }

    fn ensure_capture_dir(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.capture_dir)
    }
}

#[async_trait]
impl CameraEngine for GstCameraEngine {
    async fn request_permission(&self) -> bool {
        if self.devices.is_empty() {
            info!("No cameras, camera permission not requested");
            return false;
        }
        permissions::request_camera_access(&self.devices).await
    }

    async fn request_microphone_permission(&self) -> bool {
        permissions::request_microphone_access(self.backend == CameraBackendType::Virtual).await
    }

    fn list_devices(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    async fn start_recording(
        &self,
        device: &CameraDevice,
    ) -> Result<RecordingSession, CaptureError> {
        {
            let active = self
                .active
                .lock()
                .map_err(|_| CaptureError::StartFailed("recorder state poisoned".into()))?;
            if active.as_ref().is_some_and(|h| !h.is_finished()) {
                return Err(CaptureError::StartFailed(
                    "a recording is already running".into(),
                ));
            }
        }

        self.ensure_capture_dir()
            .map_err(|e| CaptureError::StartFailed(format!("capture directory: {}", e)))?;

        let source = device.source.clone();
        let output_path = self.capture_dir.join(capture_file_name(file_names::VIDEO_PREFIX, "mp4"));
        let bitrate_kbps = self.bitrate_preset.bitrate_kbps(recording::DEFAULT_WIDTH);

        let (completion, session) = RecordingSession::channel();
        let handle = tokio::task::spawn_blocking(move || {
            let enable_audio = source.is_virtual() || audio::microphone_available();
            let recorder = VideoRecorder::new(VideoRecorderConfig {
                source: &source,
                output_path,
                width: recording::DEFAULT_WIDTH,
                height: recording::DEFAULT_HEIGHT,
                framerate: recording::DEFAULT_FRAMERATE,
                bitrate_kbps,
                enable_audio,
            })?;
            recorder.start(completion)
        })
        .await
        .map_err(|e| CaptureError::StartFailed(e.to_string()))??;

        let mut active = self
            .active
            .lock()
            .map_err(|_| CaptureError::StartFailed("recorder state poisoned".into()))?;
        *active = Some(handle);
        info!(device = %device.name, "Recording started");
        Ok(session)
    }

    async fn stop_recording(&self) -> Result<(), CaptureError> {
        let handle = self
            .active
            .lock()
            .map_err(|_| CaptureError::StopFailed("recorder state poisoned".into()))?
            .take();

        match handle {
            Some(handle) if !handle.is_finished() => handle.request_stop(),
            _ => {
                warn!("Stop requested without an active recording");
                Err(CaptureError::NoActiveRecording)
            }
        }
    }

    async fn take_photo(&self, device: &CameraDevice) -> Result<String, CaptureError> {
        self.ensure_capture_dir()
            .map_err(|e| CaptureError::PhotoFailed(format!("capture directory: {}", e)))?;

        let source = device.source.clone();
        let output = self.capture_dir.join(capture_file_name(file_names::PHOTO_PREFIX, "jpg"));
        let warmup = self.photo_warmup;

        let path = tokio::task::spawn_blocking(move || capture_jpeg(&source, &output, warmup))
            .await
            .map_err(|e| CaptureError::PhotoFailed(e.to_string()))??;

        Ok(path.display().to_string())
    }
}
