// SPDX-License-Identifier: GPL-3.0-only

//! Permission handlers

use crate::app::state::{Message, PermissionState, Permissions};
use crate::app::{CaptureScreen, Task};
use crate::errors::{AppError, PermissionError};
use std::sync::Arc;
use tracing::{info, warn};

impl CaptureScreen {
    /// Ask camera, microphone and media library in turn
    pub(crate) fn handle_request_permissions(&mut self) -> Task {
        let engine = Arc::clone(&self.engine);
        let library = Arc::clone(&self.library);

        Task::perform(
            async move {
                let camera = PermissionState::from(engine.request_permission().await);
                let microphone =
                    PermissionState::from(engine.request_microphone_permission().await);
                let media_library = library.request_permissions().await;
                Permissions {
                    camera,
                    microphone,
                    media_library,
                }
            },
            Message::PermissionsResolved,
        )
    }

    pub(crate) fn handle_permissions_resolved(&mut self, permissions: Permissions) -> Task {
        info!(
            camera = ?permissions.camera,
            microphone = ?permissions.microphone,
            media_library = ?permissions.media_library,
            "Permissions resolved"
        );

        let mut first_denied = None;
        for (state, capability) in [
            (permissions.camera, PermissionError::CameraDenied),
            (permissions.microphone, PermissionError::MicrophoneDenied),
            (permissions.media_library, PermissionError::MediaLibraryDenied),
        ] {
            if state == PermissionState::Denied {
                warn!(capability = %capability, "Permission denied");
                first_denied.get_or_insert(capability);
            }
        }
        if let Some(err) = first_denied {
            self.last_error = Some(AppError::Permission(err));
        }

        self.state.apply_permissions(permissions);
        Task::none()
    }
}
