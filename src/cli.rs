// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for capture operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking a photo and saving it to the gallery
//! - Recording a video and saving it to the gallery
//! - Showing or writing the configuration
//!
//! Photo and video go through the same capture screen controller as the
//! interactive mode, just driven by a script instead of key presses.

use capture_screen::app::{CaptureScreen, CapturedMedia, EventLoop, Message, Phase};
use capture_screen::backends::camera::{CameraEngine, GstCameraEngine};
use capture_screen::config::Config;
use capture_screen::storage::{self, GalleryLibrary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// How long to wait for the user to answer permission prompts
const PERMISSION_TIMEOUT: Duration = Duration::from_secs(120);

/// List all available cameras
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let engine = GstCameraEngine::new(config, storage::capture_cache_dir());
    let cameras = engine.list_devices();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras ({}):", engine.backend());
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        let facing = camera
            .facing
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  [{}] {}", index, camera.name);
        println!("      Facing: {}", facing);
        println!("      Source: {}", camera.source);
        println!();
    }

    Ok(())
}

/// Take a photo and save it to the gallery
pub fn take_photo(config: Config, open_after: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut event_loop = ready_event_loop(config).await?;
        let timeout = event_loop.screen().config().photo_timeout() + Duration::from_secs(5);

        println!("Taking photo...");
        event_loop.screen_mut().clear_error();
        event_loop.dispatch(Message::TakePicture);
        event_loop
            .run_until(timeout, |s| s.state().pending_photo.is_none())
            .await;

        if !event_loop.screen().state().media.is_photo() {
            return Err(failure(event_loop.screen(), "Photo capture failed"));
        }

        let saved = save_to_gallery(&mut event_loop).await?;
        finish(&saved, open_after)
    })
}

/// Record a video for `duration` seconds (Ctrl+C stops early) and save it
pub fn record_video(
    config: Config,
    duration: u64,
    open_after: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut event_loop = ready_event_loop(config).await?;
        let stop_timeout = event_loop.screen().config().stop_timeout() + Duration::from_secs(1);

        let interrupted = Arc::new(Notify::new());
        let notify = Arc::clone(&interrupted);
        ctrlc::set_handler(move || notify.notify_one())?;

        event_loop.screen_mut().clear_error();
        event_loop.dispatch(Message::StartCapture);
        let started = event_loop
            .run_until(stop_timeout, |s| {
                s.recording_elapsed().is_some() || !s.state().recording.is_recording()
            })
            .await;
        if !started || !event_loop.screen().state().recording.is_recording() {
            return Err(failure(event_loop.screen(), "Recording did not start"));
        }

        println!("Recording for {} seconds (Ctrl+C to stop)...", duration);
        let deadline = tokio::time::sleep(Duration::from_secs(duration));
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = interrupted.notified() => {
                    println!();
                    break;
                }
                running = event_loop.step() => {
                    if !running || !event_loop.screen().state().recording.is_recording() {
                        break;
                    }
                }
            }
        }

        println!("Stopping...");
        event_loop.dispatch(Message::StopCapture);
        event_loop
            .run_until(stop_timeout, |s| !s.state().recording.is_recording())
            .await;

        if !matches!(event_loop.screen().state().media, CapturedMedia::Video(_)) {
            return Err(failure(event_loop.screen(), "Recording failed"));
        }

        let saved = save_to_gallery(&mut event_loop).await?;
        finish(&saved, open_after)
    })
}

/// Print the effective configuration, optionally writing defaults first
pub fn show_config(
    config: &Config,
    path: Option<PathBuf>,
    write_default: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.or_else(Config::path);

    if write_default {
        let path = path
            .as_deref()
            .ok_or("No configuration directory available")?;
        Config::default().save_to(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    match &path {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not present, defaults)", path.display()),
        None => println!("# defaults"),
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Screen without a player, permissions resolved and capture enabled
async fn ready_event_loop(config: Config) -> Result<EventLoop, Box<dyn std::error::Error>> {
    let capture_dir = storage::capture_cache_dir();
    let engine = Arc::new(GstCameraEngine::new(&config, capture_dir.clone()));
    let library = Arc::new(GalleryLibrary::new(&config.gallery_folder));
    let screen = CaptureScreen::new(config, engine, library).with_capture_dir(capture_dir);

    let mut event_loop = EventLoop::new(screen);
    event_loop.start();
    event_loop
        .run_until(PERMISSION_TIMEOUT, |s| s.phase() != Phase::AwaitingPermissions)
        .await;

    match event_loop.screen().phase() {
        Phase::AwaitingPermissions => Err("Timed out waiting for permissions".into()),
        Phase::CaptureUnavailable => Err(failure(
            event_loop.screen(),
            "Camera or microphone access denied",
        )),
        _ => {
            if event_loop.screen().active_device().is_none() {
                return Err("No camera found".into());
            }
            Ok(event_loop)
        }
    }
}

async fn save_to_gallery(
    event_loop: &mut EventLoop,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    event_loop.screen_mut().clear_error();
    event_loop.dispatch(Message::SaveCapturedMedia);
    event_loop
        .run_until(Duration::from_secs(30), |s| {
            s.last_saved().is_some() || s.last_error().is_some()
        })
        .await;

    event_loop
        .screen()
        .last_saved()
        .map(Path::to_path_buf)
        .ok_or_else(|| failure(event_loop.screen(), "Saving to the gallery failed"))
}

fn finish(saved: &Path, open_after: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Saved: {}", saved.display());
    if open_after {
        open::that(saved)?;
    }
    Ok(())
}

fn failure(screen: &CaptureScreen, context: &str) -> Box<dyn std::error::Error> {
    match screen.last_error() {
        Some(e) => format!("{}: {}", context, e).into(),
        None => context.into(),
    }
}
