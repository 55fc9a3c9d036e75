// SPDX-License-Identifier: GPL-3.0-only

//! In-memory collaborators for driving the capture screen in tests

#![allow(dead_code)]

use async_trait::async_trait;
use capture_screen::app::{CaptureScreen, EventLoop, PermissionState, Phase};
use capture_screen::backends::camera::{
    CameraDevice, CameraEngine, CameraFacing, DeviceSource, RecordingCompletion,
    RecordingSession,
};
use capture_screen::config::Config;
use capture_screen::errors::{AppResult, CaptureError, SaveError};
use capture_screen::media::VideoPlayer;
use capture_screen::storage::MediaLibrary;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(5);

pub fn device(name: &str, facing: CameraFacing) -> CameraDevice {
    CameraDevice {
        name: name.to_string(),
        source: DeviceSource::TestPattern {
            pattern: name.to_string(),
        },
        facing: Some(facing),
    }
}

/// Camera engine whose recordings finish when the test says so
pub struct MockEngine {
    pub camera_granted: bool,
    pub microphone_granted: bool,
    pub devices: Vec<CameraDevice>,
    pub start_error: Mutex<Option<CaptureError>>,
    pub stop_error: Mutex<Option<CaptureError>>,
    /// Recordings finish with this path as soon as stop is requested
    pub finish_on_stop: Mutex<Option<String>>,
    pub photo_result: Mutex<Result<String, CaptureError>>,
    pub photo_delay: Duration,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub completion: Mutex<Option<RecordingCompletion>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self {
            camera_granted: true,
            microphone_granted: true,
            devices: vec![
                device("back", CameraFacing::Back),
                device("front", CameraFacing::Front),
            ],
            start_error: Mutex::new(None),
            stop_error: Mutex::new(None),
            finish_on_stop: Mutex::new(None),
            photo_result: Mutex::new(Ok("/tmp/img1.jpg".to_string())),
            photo_delay: Duration::ZERO,
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            completion: Mutex::new(None),
        }
    }
}

impl MockEngine {
    /// Complete the running recording with a file
    pub fn finish_recording(&self, path: &str) {
        if let Some(completion) = self.completion.lock().unwrap().take() {
            completion.finish(path);
        }
    }

    /// Fail the running recording
    pub fn fail_recording(&self, error: CaptureError) {
        if let Some(completion) = self.completion.lock().unwrap().take() {
            completion.fail(error);
        }
    }

    pub fn has_running_recording(&self) -> bool {
        self.completion.lock().unwrap().is_some()
    }
}

#[async_trait]
impl CameraEngine for MockEngine {
    async fn request_permission(&self) -> bool {
        self.camera_granted
    }

    async fn request_microphone_permission(&self) -> bool {
        self.microphone_granted
    }

    fn list_devices(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    async fn start_recording(
        &self,
        _device: &CameraDevice,
    ) -> Result<RecordingSession, CaptureError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.start_error.lock().unwrap().clone() {
            return Err(error);
        }
        let (completion, session) = RecordingSession::channel();
        *self.completion.lock().unwrap() = Some(completion);
        Ok(session)
    }

    async fn stop_recording(&self) -> Result<(), CaptureError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.stop_error.lock().unwrap().clone() {
            return Err(error);
        }
        if let Some(path) = self.finish_on_stop.lock().unwrap().clone() {
            self.finish_recording(&path);
        }
        Ok(())
    }

    async fn take_photo(&self, _device: &CameraDevice) -> Result<String, CaptureError> {
        if !self.photo_delay.is_zero() {
            tokio::time::sleep(self.photo_delay).await;
        }
        self.photo_result.lock().unwrap().clone()
    }
}

/// Gallery that remembers what it was asked to save
pub struct MockLibrary {
    pub permission: PermissionState,
    pub fail_with: Mutex<Option<SaveError>>,
    pub saved: Mutex<Vec<PathBuf>>,
    /// How long a copy takes
    pub save_delay: Duration,
    /// Whether each source still existed when its copy finished
    pub source_present: Mutex<Vec<bool>>,
}

impl Default for MockLibrary {
    fn default() -> Self {
        Self {
            permission: PermissionState::Granted,
            fail_with: Mutex::new(None),
            saved: Mutex::new(Vec::new()),
            save_delay: Duration::ZERO,
            source_present: Mutex::new(Vec::new()),
        }
    }
}

impl MockLibrary {
    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaLibrary for MockLibrary {
    async fn request_permissions(&self) -> PermissionState {
        self.permission
    }

    async fn create_asset(&self, source: &Path) -> Result<PathBuf, SaveError> {
        self.saved.lock().unwrap().push(source.to_path_buf());
        if !self.save_delay.is_zero() {
            tokio::time::sleep(self.save_delay).await;
        }
        self.source_present.lock().unwrap().push(source.exists());
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        let name = source
            .file_name()
            .ok_or_else(|| SaveError::InvalidPath(source.display().to_string()))?;
        Ok(Path::new("/gallery").join(name))
    }
}

/// Player that records the calls it receives
#[derive(Default)]
pub struct MockPlayer {
    pub calls: Mutex<Vec<String>>,
}

impl MockPlayer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl VideoPlayer for MockPlayer {
    fn load_source(&self, path: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push(format!("load {}", path));
        Ok(())
    }

    fn set_loop(&self, looping: bool) {
        self.calls.lock().unwrap().push(format!("loop {}", looping));
    }

    fn play(&self) -> AppResult<()> {
        self.calls.lock().unwrap().push("play".to_string());
        Ok(())
    }

    fn stop(&self) {
        self.calls.lock().unwrap().push("stop".to_string());
    }
}

/// Everything a controller test needs
pub struct Harness {
    pub event_loop: EventLoop,
    pub engine: Arc<MockEngine>,
    pub library: Arc<MockLibrary>,
    pub player: Arc<MockPlayer>,
}

impl Harness {
    pub fn new(engine: MockEngine, library: MockLibrary) -> Self {
        Self::with_config(Config::default(), engine, library)
    }

    pub fn with_config(config: Config, engine: MockEngine, library: MockLibrary) -> Self {
        Self::build(config, engine, library, None)
    }

    /// Screen that deletes discarded captures inside `dir`
    pub async fn ready_with_cache(dir: &Path, engine: MockEngine, library: MockLibrary) -> Self {
        let mut harness = Self::build(Config::default(), engine, library, Some(dir));
        harness.resolve_permissions().await;
        harness
    }

    fn build(
        config: Config,
        engine: MockEngine,
        library: MockLibrary,
        capture_dir: Option<&Path>,
    ) -> Self {
        let engine = Arc::new(engine);
        let library = Arc::new(library);
        let player = Arc::new(MockPlayer::default());
        let mut screen = CaptureScreen::new(config, engine.clone(), library.clone())
            .with_player(player.clone());
        if let Some(dir) = capture_dir {
            screen = screen.with_capture_dir(dir.to_path_buf());
        }
        Self {
            event_loop: EventLoop::new(screen),
            engine,
            library,
            player,
        }
    }

    /// Start the screen and wait until permissions are answered
    pub async fn ready(engine: MockEngine, library: MockLibrary) -> Self {
        let mut harness = Self::new(engine, library);
        harness.resolve_permissions().await;
        harness
    }

    pub async fn resolve_permissions(&mut self) {
        self.event_loop.start();
        assert!(
            self.event_loop
                .run_until(WAIT, |s| s.phase() != Phase::AwaitingPermissions)
                .await
        );
    }

    pub fn screen(&self) -> &CaptureScreen {
        self.event_loop.screen()
    }

    /// Let spawned tasks run and apply whatever they sent
    pub async fn settle(&mut self) {
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            while self.event_loop.try_step() {}
        }
    }

    /// Press record and wait for the engine to confirm
    pub async fn start_recording(&mut self) {
        self.event_loop
            .dispatch(capture_screen::app::Message::StartCapture);
        assert!(
            self.event_loop
                .run_until(WAIT, |s| s.recording_elapsed().is_some())
                .await,
            "recording did not start"
        );
    }

    /// Record a clip that ends with `path`
    pub async fn record_clip(&mut self, path: &str) {
        self.start_recording().await;
        self.engine.finish_recording(path);
        assert!(
            self.event_loop
                .run_until(WAIT, |s| s.state().media.is_video())
                .await,
            "recording did not finish"
        );
    }

    pub async fn take_photo(&mut self) {
        self.event_loop
            .dispatch(capture_screen::app::Message::TakePicture);
        assert!(
            self.event_loop
                .run_until(WAIT, |s| s.state().pending_photo.is_none())
                .await,
            "photo did not resolve"
        );
    }
}
