// SPDX-License-Identifier: GPL-3.0-only

//! Capture screen controller
//!
//! # Architecture
//!
//! - `state`: serializable [`CaptureState`], transitions and [`Message`]
//! - `task`: futures handed back to the event loop
//! - `update`: message dispatch
//! - `handlers`: one module per concern (permissions, capture, camera,
//!   preview)
//! - `runtime`: the event loop that owns the screen
//!
//! # Flow
//!
//! On start the screen asks for camera, microphone and media library
//! access. Capture controls work once camera and microphone are granted;
//! saving additionally needs the media library. A finished recording or
//! photo opens the preview, which is closed either by dismissing it or by a
//! successful save.

mod handlers;
pub mod runtime;
pub mod state;
pub mod task;
mod update;

pub use runtime::EventLoop;
pub use state::{
    CaptureState, CapturedMedia, Message, Permissions, PermissionState, Phase, RecordingState,
};
pub use task::Task;

use crate::backends::camera::{CameraDevice, CameraEngine, GstCameraEngine};
use crate::config::Config;
use crate::errors::AppError;
use crate::media::{GstVideoPlayer, VideoPlayer};
use crate::storage::{self, GalleryLibrary, MediaLibrary};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// The capture screen: state plus its collaborators
pub struct CaptureScreen {
    state: CaptureState,
    config: Config,
    engine: Arc<dyn CameraEngine>,
    library: Arc<dyn MediaLibrary>,
    player: Option<Arc<dyn VideoPlayer>>,
    /// Captures inside this directory are deleted once saved or discarded
    capture_dir: Option<PathBuf>,
    last_error: Option<AppError>,
    last_saved: Option<PathBuf>,
    recording_started_at: Option<Instant>,
    /// Captures with a gallery copy in flight
    saving: HashSet<String>,
    discard_after_save: HashSet<String>,
}

impl CaptureScreen {
    pub fn new(
        config: Config,
        engine: Arc<dyn CameraEngine>,
        library: Arc<dyn MediaLibrary>,
    ) -> Self {
        let mut facing = config.initial_facing;
        if engine.resolve_device(facing).is_none()
            && engine.resolve_device(facing.opposite()).is_some()
        {
            info!(requested = %facing, "No camera for requested facing, using the other one");
            facing = facing.opposite();
        }

        Self {
            state: CaptureState::new(facing),
            config,
            engine,
            library,
            player: None,
            capture_dir: None,
            last_error: None,
            last_saved: None,
            recording_started_at: None,
            saving: HashSet::new(),
            discard_after_save: HashSet::new(),
        }
    }

    /// Screen backed by GStreamer, the XDG gallery and a `playbin` player
    pub fn from_config(config: Config) -> Self {
        let capture_dir = storage::capture_cache_dir();
        let engine = Arc::new(GstCameraEngine::new(&config, capture_dir.clone()));
        let library = Arc::new(GalleryLibrary::new(&config.gallery_folder));
        Self::new(config, engine, library)
            .with_player(Arc::new(GstVideoPlayer::new()))
            .with_capture_dir(capture_dir)
    }

    pub fn with_player(mut self, player: Arc<dyn VideoPlayer>) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_capture_dir(mut self, dir: PathBuf) -> Self {
        self.capture_dir = Some(dir);
        self
    }

    /// First task to run: ask for permissions
    pub fn init(&self) -> Task {
        Task::done(Message::RequestPermissions)
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn devices(&self) -> Vec<CameraDevice> {
        self.engine.list_devices()
    }

    /// Camera serving the current facing
    pub fn active_device(&self) -> Option<CameraDevice> {
        self.engine.resolve_device(self.state.facing)
    }

    /// Most recent collaborator failure
    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Gallery path of the most recent save
    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }

    pub fn recording_elapsed(&self) -> Option<Duration> {
        self.recording_started_at.map(|t| t.elapsed())
    }
}
