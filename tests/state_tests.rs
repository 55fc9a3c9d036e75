// SPDX-License-Identifier: GPL-3.0-only

//! Capture state transitions without any collaborators

use capture_screen::app::{
    CaptureState, CapturedMedia, Permissions, PermissionState, Phase, RecordingState,
};
use capture_screen::backends::camera::CameraFacing;
use uuid::Uuid;

fn granted() -> CaptureState {
    let mut state = CaptureState::new(CameraFacing::Back);
    state.apply_permissions(Permissions {
        camera: PermissionState::Granted,
        microphone: PermissionState::Granted,
        media_library: PermissionState::Granted,
    });
    state
}

fn recording(state: &mut CaptureState) -> Uuid {
    let session = Uuid::new_v4();
    state.begin_recording(session);
    assert_eq!(state.recording_started(session), Some(false));
    session
}

#[test]
fn test_phase_follows_permissions() {
    let mut state = CaptureState::default();
    assert_eq!(state.phase(), Phase::AwaitingPermissions);

    state.apply_permissions(Permissions {
        camera: PermissionState::Granted,
        microphone: PermissionState::Denied,
        media_library: PermissionState::Granted,
    });
    assert_eq!(state.phase(), Phase::CaptureUnavailable);
    assert!(state.permissions.can_save());

    assert_eq!(granted().phase(), Phase::Idle);
}

#[test]
fn test_record_and_dismiss_round_trip() {
    let mut state = granted();
    let initial = state.clone();

    let session = recording(&mut state);
    assert_eq!(state.phase(), Phase::Recording);
    assert_eq!(state.request_stop(), Some(session));
    assert_eq!(
        state.finish_recording(session, "/tmp/a.mp4".into()),
        Some(CapturedMedia::None)
    );
    assert_eq!(state.phase(), Phase::PreviewingVideo);

    let dropped = state.dismiss_preview();
    assert_eq!(dropped, CapturedMedia::Video("/tmp/a.mp4".into()));
    assert_eq!(state, initial);
}

#[test]
fn test_photo_replaces_video() {
    let mut state = granted();
    let session = recording(&mut state);
    state.finish_recording(session, "/tmp/a.mp4".into());

    let request = Uuid::new_v4();
    let dropped = state.begin_photo(request);
    assert!(dropped.is_video());
    assert!(state.media.is_none());
    assert!(!state.preview_visible);

    assert!(state.photo_captured(request, "/tmp/b.jpg".into()).is_some());
    assert_eq!(state.media, CapturedMedia::Photo("/tmp/b.jpg".into()));
    assert_eq!(state.phase(), Phase::PreviewingPhoto);
}

#[test]
fn test_begin_recording_clears_media_first() {
    let mut state = granted();
    let request = Uuid::new_v4();
    state.begin_photo(request);
    state.photo_captured(request, "/tmp/b.jpg".into());

    let dropped = state.begin_recording(Uuid::new_v4());
    assert!(dropped.is_photo());
    assert!(state.media.is_none());
    assert!(!state.preview_visible);
}

#[test]
fn test_recording_supersedes_pending_photo() {
    let mut state = granted();
    let request = Uuid::new_v4();
    state.begin_photo(request);
    recording(&mut state);

    assert_eq!(state.photo_captured(request, "/tmp/late.jpg".into()), None);
    assert!(state.media.is_none());
}

#[test]
fn test_stale_session_is_ignored() {
    let mut state = granted();
    let old = recording(&mut state);
    assert!(state.fail_recording(old));

    let current = recording(&mut state);
    assert_eq!(state.finish_recording(old, "/tmp/old.mp4".into()), None);
    assert_eq!(state.recording_started(old), None);
    assert!(!state.fail_recording(old));
    assert_eq!(state.recording.session(), Some(current));
    assert!(state.media.is_none());
}

#[test]
fn test_stop_before_start_is_deferred() {
    let mut state = granted();
    let session = Uuid::new_v4();
    state.begin_recording(session);

    // Not confirmed yet, so nothing to stop right away
    assert_eq!(state.request_stop(), None);
    assert!(state.recording.is_stopping());
    // The confirmation reports the pending stop
    assert_eq!(state.recording_started(session), Some(true));
}

#[test]
fn test_photo_during_recording_is_replaced_by_clip() {
    let mut state = granted();
    let session = recording(&mut state);
    let request = Uuid::new_v4();
    state.begin_photo(request);
    state.photo_captured(request, "/tmp/b.jpg".into());
    assert!(state.recording.is_recording());

    let displaced = state.finish_recording(session, "/tmp/a.mp4".into());
    assert_eq!(displaced, Some(CapturedMedia::Photo("/tmp/b.jpg".into())));
    assert_eq!(state.media, CapturedMedia::Video("/tmp/a.mp4".into()));
}

#[test]
fn test_late_photo_replaces_finished_clip() {
    let mut state = granted();
    let session = recording(&mut state);
    let request = Uuid::new_v4();
    state.begin_photo(request);
    state.finish_recording(session, "/tmp/a.mp4".into());

    let displaced = state.photo_captured(request, "/tmp/b.jpg".into());
    assert_eq!(displaced, Some(CapturedMedia::Video("/tmp/a.mp4".into())));
    assert_eq!(state.media, CapturedMedia::Photo("/tmp/b.jpg".into()));
    assert!(state.preview_visible);
}

#[test]
fn test_failed_recording_shows_nothing() {
    let mut state = granted();
    let session = recording(&mut state);
    assert!(state.fail_recording(session));

    assert_eq!(state.recording, RecordingState::Idle);
    assert!(state.media.is_none());
    assert!(!state.preview_visible);
}

#[test]
fn test_dismiss_resets_stuck_recording() {
    let mut state = granted();
    let session = recording(&mut state);
    state.request_stop();

    state.dismiss_preview();
    assert_eq!(state.recording, RecordingState::Idle);
    assert!(!state.is_active_session(session));
}

#[test]
fn test_toggle_facing_refused_while_recording() {
    let mut state = granted();
    assert_eq!(state.toggle_facing(), Some(CameraFacing::Front));

    recording(&mut state);
    assert_eq!(state.toggle_facing(), None);
    assert_eq!(state.facing, CameraFacing::Front);
}

#[test]
fn test_media_saved_only_clears_matching_path() {
    let mut state = granted();
    let request = Uuid::new_v4();
    state.begin_photo(request);
    state.photo_captured(request, "/tmp/b.jpg".into());

    assert!(!state.media_saved("/tmp/other.jpg"));
    assert!(state.preview_visible);

    assert!(state.media_saved("/tmp/b.jpg"));
    assert!(state.media.is_none());
    assert!(!state.preview_visible);
}

#[test]
fn test_state_serializes() {
    let mut state = granted();
    recording(&mut state);

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["facing"], "Back");
    assert_eq!(json["media"]["kind"], "None");
    assert!(json["recording"]["Recording"]["started"].as_bool().unwrap());

    let back: CaptureState = serde_json::from_value(json).unwrap();
    assert_eq!(back, state);
}
