// SPDX-License-Identifier: GPL-3.0-only

//! Message dispatch

use super::{CaptureScreen, Message, Task};
use tracing::trace;

impl CaptureScreen {
    pub fn update(&mut self, message: Message) -> Task {
        trace!(?message, "update");
        match message {
            // ===== Permissions =====
            Message::RequestPermissions => self.handle_request_permissions(),
            Message::PermissionsResolved(permissions) => {
                self.handle_permissions_resolved(permissions)
            }

            // ===== Recording =====
            Message::StartCapture => self.handle_start_capture(),
            Message::RecordingStarted { session } => self.handle_recording_started(session),
            Message::RecordingFinished { session, result } => {
                self.handle_recording_finished(session, result)
            }
            Message::StopCapture => self.handle_stop_capture(),
            Message::StopFailed { session, error } => self.handle_stop_failed(session, error),
            Message::StopDeadlineElapsed { session } => self.handle_stop_deadline(session),

            // ===== Photo =====
            Message::TakePicture => self.handle_take_picture(),
            Message::PhotoCaptured { request, result } => {
                self.handle_photo_captured(request, result)
            }

            // ===== Camera =====
            Message::ToggleCameraFacing => self.handle_toggle_camera_facing(),

            // ===== Preview =====
            Message::DismissPreview => self.handle_dismiss_preview(),
            Message::SaveCapturedMedia => self.handle_save_captured_media(),
            Message::MediaSaved { source, result } => self.handle_media_saved(source, result),
        }
    }
}
