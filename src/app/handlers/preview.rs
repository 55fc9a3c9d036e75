// SPDX-License-Identifier: GPL-3.0-only

//! Preview handlers: close, save to gallery, and clip playback

use crate::app::state::{CapturedMedia, Message, RecordingState};
use crate::app::{CaptureScreen, Task};
use crate::errors::SaveError;
use crate::storage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

impl CaptureScreen {
    pub(crate) fn handle_dismiss_preview(&mut self) -> Task {
        // A pending start is stopped once the engine confirms it, and a
        // pending stop needs no second request
        let was_running = matches!(
            self.state.recording,
            RecordingState::Recording {
                started: true,
                stop_requested: false,
                ..
            }
        );
        let discarded = self.state.dismiss_preview();
        self.recording_started_at = None;
        self.release_media(discarded);
        debug!("Preview dismissed");

        if !was_running {
            return Task::none();
        }

        // Recording state was forced off; let the engine wind down anyway
        let engine = Arc::clone(&self.engine);
        Task::optional(async move {
            if let Err(e) = engine.stop_recording().await {
                debug!(error = %e, "Stop after dismiss failed");
            }
            None
        })
    }

    pub(crate) fn handle_save_captured_media(&mut self) -> Task {
        let Some(path) = self.state.media.path().map(str::to_owned) else {
            debug!("Nothing to save");
            return Task::none();
        };
        if !self.state.permissions.can_save() {
            warn!("Media library access not granted, cannot save");
            self.last_error = Some(SaveError::PermissionDenied.into());
            return Task::none();
        }

        let source = PathBuf::from(storage::strip_file_scheme(&path));
        info!(path = %source.display(), "Saving capture to gallery");
        self.saving.insert(path.clone());

        let library = Arc::clone(&self.library);
        Task::perform(
            async move { library.create_asset(&source).await },
            move |result| Message::MediaSaved {
                source: path,
                result,
            },
        )
    }

    pub(crate) fn handle_media_saved(
        &mut self,
        source: String,
        result: Result<PathBuf, SaveError>,
    ) -> Task {
        self.saving.remove(&source);
        // Left the screen while the copy ran
        let abandoned = self.discard_after_save.remove(&source);

        match result {
            Ok(destination) => {
                info!(destination = %destination.display(), "Capture saved");
                if self.state.media_saved(&source) {
                    self.stop_preview();
                    self.discard_file(&source);
                } else if abandoned {
                    self.discard_file(&source);
                }
                self.last_saved = Some(destination);
            }
            Err(e) => {
                error!(error = %e, path = %source, "Failed to save capture");
                if abandoned {
                    self.discard_file(&source);
                }
                self.last_error = Some(e.into());
            }
        }
        Task::none()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Stop playing and delete a capture that left the screen unsaved
    pub(crate) fn release_media(&mut self, media: CapturedMedia) {
        if media.is_video() {
            self.stop_preview();
        }
        if let Some(path) = media.path() {
            self.discard_file(path);
        }
    }

    /// Delete a capture from the cache, once any save of it has finished
    pub(crate) fn discard_file(&mut self, path: &str) {
        if self.saving.contains(path) {
            debug!(path, "Capture is being saved, discarding it afterwards");
            self.discard_after_save.insert(path.to_string());
            return;
        }
        if let Some(dir) = &self.capture_dir {
            storage::discard_capture(dir, path);
        }
    }

    pub(crate) fn play_preview(&self, path: &str) {
        let Some(player) = &self.player else {
            return;
        };
        let result = player
            .load_source(storage::strip_file_scheme(path))
            .and_then(|()| {
                player.set_loop(self.config.loop_preview);
                player.play()
            });
        if let Err(e) = result {
            warn!(error = %e, "Failed to play recorded clip");
        }
    }

    fn stop_preview(&self) {
        if let Some(player) = &self.player {
            player.stop();
        }
    }
}
