// SPDX-License-Identifier: GPL-3.0-only

//! Camera selection handlers

use crate::app::{CaptureScreen, Task};
use tracing::{debug, info, warn};

impl CaptureScreen {
    pub(crate) fn handle_toggle_camera_facing(&mut self) -> Task {
        let target = self.state.facing.opposite();

        if self.state.recording.is_recording() {
            warn!("Camera switch refused while recording");
            return Task::none();
        }
        if self.engine.resolve_device(target).is_none() {
            debug!(facing = %target, "No camera for facing");
            return Task::none();
        }

        if let Some(facing) = self.state.toggle_facing() {
            info!(%facing, "Switched camera");
        }
        Task::none()
    }
}
