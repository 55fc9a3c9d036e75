// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles video recording sessions and single photo capture.

use crate::app::state::Message;
use crate::app::{CaptureScreen, Task};
use crate::errors::CaptureError;
use futures::{StreamExt, stream};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

impl CaptureScreen {
    // =========================================================================
    // Recording
    // =========================================================================

    pub(crate) fn handle_start_capture(&mut self) -> Task {
        if !self.state.permissions.capture_enabled() {
            debug!("Capture controls disabled, ignoring record");
            return Task::none();
        }
        if self.state.recording.is_recording() {
            debug!("Already recording");
            return Task::none();
        }
        let Some(device) = self.active_device() else {
            warn!(facing = %self.state.facing, "No camera for current facing");
            return Task::none();
        };

        let session = Uuid::new_v4();
        let discarded = self.state.begin_recording(session);
        self.release_media(discarded);
        self.recording_started_at = None;
        info!(%session, device = %device.name, "Starting recording");

        let engine = Arc::clone(&self.engine);
        let started = async move { engine.start_recording(&device).await };

        Task::run(stream::once(started).flat_map(move |result| match result {
            Ok(recording) => stream::iter([Message::RecordingStarted { session }])
                .chain(stream::once(async move {
                    Message::RecordingFinished {
                        session,
                        result: recording.finished().await,
                    }
                }))
                .boxed(),
            Err(error) => stream::iter([Message::RecordingFinished {
                session,
                result: Err(error),
            }])
            .boxed(),
        }))
    }

    pub(crate) fn handle_recording_started(&mut self, session: Uuid) -> Task {
        match self.state.recording_started(session) {
            None => {
                // Dismissed before the engine was ready; it is running now
                info!(%session, "Stopping abandoned recording");
                let engine = Arc::clone(&self.engine);
                Task::optional(async move {
                    if let Err(error) = engine.stop_recording().await {
                        warn!(%session, %error, "Failed to stop abandoned recording");
                    }
                    None
                })
            }
            Some(stop_requested) => {
                self.recording_started_at = Some(Instant::now());
                info!(%session, "Recording started");
                if stop_requested {
                    // Released before the engine was ready
                    self.stop_task(session)
                } else {
                    Task::none()
                }
            }
        }
    }

    pub(crate) fn handle_stop_capture(&mut self) -> Task {
        if !self.state.recording.is_recording() {
            debug!("No recording to stop");
            return Task::none();
        }
        match self.state.request_stop() {
            Some(session) => self.stop_task(session),
            None => {
                debug!("Stop already pending");
                Task::none()
            }
        }
    }

    /// Ask the engine to stop and arm the stop deadline
    fn stop_task(&self, session: Uuid) -> Task {
        info!(%session, "Stopping recording");
        let engine = Arc::clone(&self.engine);
        let timeout = self.config.stop_timeout();

        Task::batch([
            Task::optional(async move {
                engine
                    .stop_recording()
                    .await
                    .err()
                    .map(|error| Message::StopFailed { session, error })
            }),
            Task::future(async move {
                tokio::time::sleep(timeout).await;
                Message::StopDeadlineElapsed { session }
            }),
        ])
    }

    pub(crate) fn handle_recording_finished(
        &mut self,
        session: Uuid,
        result: Result<String, CaptureError>,
    ) -> Task {
        if !self.state.is_active_session(session) {
            debug!(%session, "Ignoring outcome of abandoned recording");
            if let Ok(path) = result {
                self.discard_file(&path);
            }
            return Task::none();
        }

        self.recording_started_at = None;
        match result {
            Ok(path) => {
                info!(%session, path = %path, "Recording finished");
                if let Some(displaced) = self.state.finish_recording(session, path.clone()) {
                    self.release_media(displaced);
                }
                self.play_preview(&path);
            }
            Err(error) => {
                error!(%session, %error, "Recording failed");
                self.state.fail_recording(session);
                self.last_error = Some(error.into());
            }
        }
        Task::none()
    }

    pub(crate) fn handle_stop_failed(&mut self, session: Uuid, error: CaptureError) -> Task {
        if self.state.fail_recording(session) {
            error!(%session, %error, "Failed to stop recording, abandoning it");
            self.recording_started_at = None;
            self.last_error = Some(error.into());
        }
        Task::none()
    }

    pub(crate) fn handle_stop_deadline(&mut self, session: Uuid) -> Task {
        if self.state.fail_recording(session) {
            warn!(%session, "Recording did not finish in time, abandoning it");
            self.recording_started_at = None;
            self.last_error = Some(CaptureError::Timeout.into());
        }
        Task::none()
    }

    // =========================================================================
    // Photo
    // =========================================================================

    pub(crate) fn handle_take_picture(&mut self) -> Task {
        if !self.state.permissions.capture_enabled() {
            debug!("Capture controls disabled, ignoring photo");
            return Task::none();
        }
        let Some(device) = self.active_device() else {
            warn!(facing = %self.state.facing, "No camera for current facing");
            return Task::none();
        };

        let request = Uuid::new_v4();
        let discarded = self.state.begin_photo(request);
        self.release_media(discarded);
        info!(%request, device = %device.name, "Taking photo");

        let engine = Arc::clone(&self.engine);
        let timeout = self.config.photo_timeout();
        Task::perform(
            async move {
                tokio::time::timeout(timeout, engine.take_photo(&device))
                    .await
                    .unwrap_or(Err(CaptureError::Timeout))
            },
            move |result| Message::PhotoCaptured { request, result },
        )
    }

    pub(crate) fn handle_photo_captured(
        &mut self,
        request: Uuid,
        result: Result<String, CaptureError>,
    ) -> Task {
        match result {
            Ok(path) => match self.state.photo_captured(request, path.clone()) {
                Some(displaced) => {
                    info!(path = %path, "Photo captured");
                    self.release_media(displaced);
                }
                None => {
                    debug!(%request, "Ignoring superseded photo");
                    self.discard_file(&path);
                }
            },
            Err(error) => {
                if self.state.photo_failed(request) {
                    error!(%error, "Photo capture failed");
                    self.last_error = Some(error.into());
                } else {
                    debug!(%request, %error, "Ignoring failure of superseded photo");
                }
            }
        }
        Task::none()
    }
}
