// SPDX-License-Identifier: MPL-2.0

//! Camera engine abstraction
//!
//! The capture screen never talks to GStreamer directly. It drives a
//! [`CameraEngine`], which owns device discovery, permissions and the
//! capture pipelines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   CaptureScreen     │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraEngine Trait  │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  GstCameraEngine    │  ← PipeWire / V4L2 / test sources
//! └─────────────────────┘
//! ```
//!
//! Recording is session based: [`CameraEngine::start_recording`] hands back a
//! [`RecordingSession`] whose outcome resolves once the engine has finished
//! writing the file or hit an error. Stopping only asks the engine to wind
//! down; the session outcome is what ends the recording.

pub mod engine;
pub mod enumeration;
pub mod types;

pub use engine::GstCameraEngine;
pub use types::*;

use crate::errors::CaptureError;
use async_trait::async_trait;
use tokio::sync::oneshot;

/// Outcome of a recording: the written file path or the failure
pub type RecordingOutcome = Result<String, CaptureError>;

/// Camera capture engine
#[async_trait]
pub trait CameraEngine: Send + Sync {
    /// Ask for camera access
    async fn request_permission(&self) -> bool;

    /// Ask for microphone access
    async fn request_microphone_permission(&self) -> bool;

    /// Cameras known to the engine
    fn list_devices(&self) -> Vec<CameraDevice>;

    /// Find the camera serving the given facing
    fn resolve_device(&self, facing: CameraFacing) -> Option<CameraDevice> {
        self.list_devices().into_iter().find(|d| d.serves(facing))
    }

    /// Begin recording from `device`
    ///
    /// Returns once the pipeline runs. The file is only complete when the
    /// returned session resolves.
    async fn start_recording(
        &self,
        device: &CameraDevice,
    ) -> Result<RecordingSession, CaptureError>;

    /// Ask the active recording to finish
    async fn stop_recording(&self) -> Result<(), CaptureError>;

    /// Capture a single photo and return its path
    async fn take_photo(&self, device: &CameraDevice) -> Result<String, CaptureError>;
}

/// Receiving half of a recording, resolves with the recording outcome
#[derive(Debug)]
pub struct RecordingSession {
    outcome: oneshot::Receiver<RecordingOutcome>,
}

/// Sending half of a recording, held by whoever watches the pipeline
#[derive(Debug)]
pub struct RecordingCompletion {
    sender: oneshot::Sender<RecordingOutcome>,
}

impl RecordingSession {
    /// Create a connected completion/session pair
    pub fn channel() -> (RecordingCompletion, RecordingSession) {
        let (sender, outcome) = oneshot::channel();
        (RecordingCompletion { sender }, RecordingSession { outcome })
    }

    /// Wait for the recording to finish or fail
    pub async fn finished(self) -> RecordingOutcome {
        self.outcome.await.unwrap_or_else(|_| {
            Err(CaptureError::PipelineError(
                "recording ended without reporting a result".to_string(),
            ))
        })
    }
}

impl RecordingCompletion {
    pub fn finish(self, path: impl Into<String>) {
        let _ = self.sender.send(Ok(path.into()));
    }

    pub fn fail(self, error: CaptureError) {
        let _ = self.sender.send(Err(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_resolves_with_finished_path() {
        let (completion, session) = RecordingSession::channel();
        completion.finish("/tmp/clip.mp4");
        assert_eq!(session.finished().await, Ok("/tmp/clip.mp4".to_string()));
    }

    #[tokio::test]
    async fn dropped_completion_is_an_error() {
        let (completion, session) = RecordingSession::channel();
        drop(completion);
        assert!(matches!(
            session.finished().await,
            Err(CaptureError::PipelineError(_))
        ));
    }
}
