// SPDX-License-Identifier: GPL-3.0-only

//! Capture screen state
//!
//! [`CaptureState`] is plain data: every transition is a method that only
//! touches the state itself, so it can be driven and inspected without any
//! camera, gallery or player behind it.

use crate::backends::camera::CameraFacing;
use crate::errors::{CaptureError, SaveError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Answer to a capability request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PermissionState {
    /// Not asked yet, or no answer
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl From<bool> for PermissionState {
    fn from(granted: bool) -> Self {
        if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }
}

/// Grants for every capability the screen uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub camera: PermissionState,
    pub microphone: PermissionState,
    pub media_library: PermissionState,
}

impl Permissions {
    /// Photo and record controls need both camera and microphone
    pub fn capture_enabled(&self) -> bool {
        self.camera == PermissionState::Granted && self.microphone == PermissionState::Granted
    }

    /// Saving to the gallery only needs the media library grant
    pub fn can_save(&self) -> bool {
        self.media_library == PermissionState::Granted
    }

    pub fn is_resolved(&self) -> bool {
        [self.camera, self.microphone, self.media_library]
            .iter()
            .all(|p| *p != PermissionState::Unknown)
    }
}

/// Recording state machine
///
/// A recording is identified by a session id from the moment it is
/// requested. Outcomes carrying any other id are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Recording requested or running
    Recording {
        session: Uuid,
        /// The engine confirmed the pipeline runs
        started: bool,
        /// A stop was asked for
        stop_requested: bool,
    },
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording { .. })
    }

    pub fn session(&self) -> Option<Uuid> {
        match self {
            RecordingState::Idle => None,
            RecordingState::Recording { session, .. } => Some(*session),
        }
    }

    pub fn is_stopping(&self) -> bool {
        matches!(
            self,
            RecordingState::Recording {
                stop_requested: true,
                ..
            }
        )
    }
}

/// The most recent capture, if any
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path")]
pub enum CapturedMedia {
    #[default]
    None,
    Video(String),
    Photo(String),
}

impl CapturedMedia {
    pub fn path(&self) -> Option<&str> {
        match self {
            CapturedMedia::None => None,
            CapturedMedia::Video(path) | CapturedMedia::Photo(path) => Some(path),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, CapturedMedia::None)
    }

    pub fn is_video(&self) -> bool {
        matches!(self, CapturedMedia::Video(_))
    }

    pub fn is_photo(&self) -> bool {
        matches!(self, CapturedMedia::Photo(_))
    }
}

/// Coarse screen phase derived from the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingPermissions,
    /// Camera or microphone refused, controls stay disabled
    CaptureUnavailable,
    Idle,
    Recording,
    PreviewingVideo,
    PreviewingPhoto,
}

/// Everything the capture screen shows
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureState {
    pub facing: CameraFacing,
    pub permissions: Permissions,
    pub recording: RecordingState,
    pub media: CapturedMedia,
    pub preview_visible: bool,
    /// Photo request whose result will be shown
    pub pending_photo: Option<Uuid>,
}

impl CaptureState {
    pub fn new(facing: CameraFacing) -> Self {
        Self {
            facing,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.permissions.is_resolved() {
            return Phase::AwaitingPermissions;
        }
        if !self.permissions.capture_enabled() {
            return Phase::CaptureUnavailable;
        }
        if self.recording.is_recording() {
            return Phase::Recording;
        }
        match (&self.media, self.preview_visible) {
            (CapturedMedia::Video(_), true) => Phase::PreviewingVideo,
            (CapturedMedia::Photo(_), true) => Phase::PreviewingPhoto,
            _ => Phase::Idle,
        }
    }

    pub fn apply_permissions(&mut self, permissions: Permissions) {
        self.permissions = permissions;
    }

    pub fn is_active_session(&self, session: Uuid) -> bool {
        self.recording.session() == Some(session)
    }

    /// Drop the current capture and hide the preview, returning what was dropped
    pub fn clear_media(&mut self) -> CapturedMedia {
        self.preview_visible = false;
        std::mem::take(&mut self.media)
    }

    /// Enter Recording, discarding any previous capture first
    pub fn begin_recording(&mut self, session: Uuid) -> CapturedMedia {
        let discarded = self.clear_media();
        self.pending_photo = None;
        self.recording = RecordingState::Recording {
            session,
            started: false,
            stop_requested: false,
        };
        discarded
    }

    /// The engine confirmed the recording runs
    ///
    /// Returns `Some(stop_requested)` for the active session, `None` for a
    /// stale one.
    pub fn recording_started(&mut self, session: Uuid) -> Option<bool> {
        match &mut self.recording {
            RecordingState::Recording {
                session: active,
                started,
                stop_requested,
            } if *active == session => {
                *started = true;
                Some(*stop_requested)
            }
            _ => None,
        }
    }

    /// Mark the recording as stopping
    ///
    /// Returns the session to stop now. A recording that has not started yet
    /// only remembers the request and returns `None`, as does a second stop.
    pub fn request_stop(&mut self) -> Option<Uuid> {
        match &mut self.recording {
            RecordingState::Recording {
                session,
                started,
                stop_requested,
            } if !*stop_requested => {
                *stop_requested = true;
                started.then_some(*session)
            }
            _ => None,
        }
    }

    /// The recording wrote `path`; show it
    ///
    /// Returns the capture it replaced, or `None` for a stale session.
    pub fn finish_recording(&mut self, session: Uuid, path: String) -> Option<CapturedMedia> {
        if !self.is_active_session(session) {
            return None;
        }
        self.recording = RecordingState::Idle;
        self.preview_visible = true;
        Some(std::mem::replace(&mut self.media, CapturedMedia::Video(path)))
    }

    /// The recording failed, was abandoned or timed out
    pub fn fail_recording(&mut self, session: Uuid) -> bool {
        if !self.is_active_session(session) {
            return false;
        }
        self.recording = RecordingState::Idle;
        true
    }

    /// Request a photo, discarding any previous capture first
    pub fn begin_photo(&mut self, request: Uuid) -> CapturedMedia {
        self.pending_photo = Some(request);
        self.clear_media()
    }

    /// The photo landed at `path`; show it
    ///
    /// A clip finished while the photo was pending is replaced and returned.
    /// `None` means the request was superseded.
    pub fn photo_captured(&mut self, request: Uuid, path: String) -> Option<CapturedMedia> {
        if self.pending_photo != Some(request) {
            return None;
        }
        self.pending_photo = None;
        self.preview_visible = true;
        Some(std::mem::replace(&mut self.media, CapturedMedia::Photo(path)))
    }

    pub fn photo_failed(&mut self, request: Uuid) -> bool {
        if self.pending_photo != Some(request) {
            return false;
        }
        self.pending_photo = None;
        true
    }

    /// Flip the camera; refused while recording
    pub fn toggle_facing(&mut self) -> Option<CameraFacing> {
        if self.recording.is_recording() {
            return None;
        }
        self.facing = self.facing.opposite();
        Some(self.facing)
    }

    /// Close the preview
    ///
    /// Also resets the recording state, so a stuck recording can always be
    /// left through the close action.
    pub fn dismiss_preview(&mut self) -> CapturedMedia {
        self.recording = RecordingState::Idle;
        self.pending_photo = None;
        self.clear_media()
    }

    /// `source` reached the gallery; clear it if it is still on screen
    pub fn media_saved(&mut self, source: &str) -> bool {
        if self.media.path() != Some(source) {
            return false;
        }
        self.clear_media();
        true
    }
}

/// Messages driving the capture screen
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Permissions =====
    /// Ask for camera, microphone and media library access
    RequestPermissions,
    PermissionsResolved(Permissions),

    // ===== Recording =====
    /// Record control pressed
    StartCapture,
    RecordingStarted {
        session: Uuid,
    },
    RecordingFinished {
        session: Uuid,
        result: Result<String, CaptureError>,
    },
    /// Record control released
    StopCapture,
    StopFailed {
        session: Uuid,
        error: CaptureError,
    },
    StopDeadlineElapsed {
        session: Uuid,
    },

    // ===== Photo =====
    TakePicture,
    PhotoCaptured {
        request: Uuid,
        result: Result<String, CaptureError>,
    },

    // ===== Camera =====
    ToggleCameraFacing,

    // ===== Preview =====
    DismissPreview,
    SaveCapturedMedia,
    MediaSaved {
        source: String,
        result: Result<PathBuf, SaveError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_from_answers() {
        assert_eq!(PermissionState::from(true), PermissionState::Granted);
        assert_eq!(PermissionState::from(false), PermissionState::Denied);
    }

    #[test]
    fn media_serializes_as_tagged_variant() {
        let json = serde_json::to_string(&CapturedMedia::Photo("/tmp/a.jpg".into())).unwrap();
        assert_eq!(json, r#"{"kind":"Photo","path":"/tmp/a.jpg"}"#);
        let back: CapturedMedia = serde_json::from_str(&json).unwrap();
        assert!(back.is_photo());
    }

    #[test]
    fn second_stop_is_ignored() {
        let mut state = CaptureState::default();
        let session = Uuid::new_v4();
        state.begin_recording(session);
        state.recording_started(session);
        assert_eq!(state.request_stop(), Some(session));
        assert_eq!(state.request_stop(), None);
        assert!(state.recording.is_stopping());
    }
}
