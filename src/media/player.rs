// SPDX-License-Identifier: MPL-2.0

//! Video preview player

use crate::errors::{AppError, AppResult};
use gstreamer as gst;
use gstreamer::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Plays a recorded clip in the preview
pub trait VideoPlayer: Send + Sync {
    /// Load a local file, replacing whatever was loaded before
    fn load_source(&self, path: &str) -> AppResult<()>;

    /// Restart from the beginning when the clip ends
    fn set_loop(&self, looping: bool);

    fn play(&self) -> AppResult<()>;

    /// Stop playback and release the clip
    fn stop(&self);
}

/// `playbin` based player
#[derive(Default)]
pub struct GstVideoPlayer {
    playback: Mutex<Option<Playback>>,
    looping: Arc<AtomicBool>,
}

struct Playback {
    playbin: gst::Element,
    shutdown: Arc<AtomicBool>,
    watcher: Option<JoinHandle<()>>,
}

impl GstVideoPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoPlayer for GstVideoPlayer {
    fn load_source(&self, path: &str) -> AppResult<()> {
        self.stop();
        gst::init().map_err(|e| AppError::Other(format!("GStreamer init: {}", e)))?;

        let uri = gst::glib::filename_to_uri(path, None)
            .map_err(|e| AppError::Other(format!("Invalid video path {}: {}", path, e)))?;
        let playbin = gst::ElementFactory::make("playbin")
            .property("uri", uri.as_str())
            .build()
            .map_err(|e| AppError::Other(format!("Failed to create playbin: {}", e)))?;

        let bus = playbin
            .bus()
            .ok_or_else(|| AppError::Other("playbin has no bus".into()))?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let watcher = {
            let playbin = playbin.clone();
            let shutdown = Arc::clone(&shutdown);
            let looping = Arc::clone(&self.looping);
            std::thread::Builder::new()
                .name("preview-player".into())
                .spawn(move || watch_bus(playbin, bus, shutdown, looping))
                .map_err(|e| AppError::Other(format!("Failed to spawn player thread: {}", e)))?
        };

        info!(uri = %uri, "Loaded preview clip");
        let mut playback = self
            .playback
            .lock()
            .map_err(|_| AppError::Other("player state poisoned".into()))?;
        *playback = Some(Playback {
            playbin,
            shutdown,
            watcher: Some(watcher),
        });
        Ok(())
    }

    fn set_loop(&self, looping: bool) {
        self.looping.store(looping, Ordering::SeqCst);
    }

    fn play(&self) -> AppResult<()> {
        let playback = self
            .playback
            .lock()
            .map_err(|_| AppError::Other("player state poisoned".into()))?;
        let playback = playback
            .as_ref()
            .ok_or_else(|| AppError::Other("no clip loaded".into()))?;
        playback
            .playbin
            .set_state(gst::State::Playing)
            .map_err(|e| AppError::Other(format!("Failed to play clip: {}", e)))?;
        Ok(())
    }

    fn stop(&self) {
        let previous = match self.playback.lock() {
            Ok(mut playback) => playback.take(),
            Err(_) => None,
        };
        drop(previous);
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.playbin.set_state(gst::State::Null);
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.join();
        }
        debug!("Preview playback released");
    }
}

fn watch_bus(
    playbin: gst::Element,
    bus: gst::Bus,
    shutdown: Arc<AtomicBool>,
    looping: Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::SeqCst) {
        let Some(msg) = bus.timed_pop_filtered(
            gst::ClockTime::from_mseconds(crate::constants::timing::BUS_POLL_INTERVAL_MS),
            &[gst::MessageType::Eos, gst::MessageType::Error],
        ) else {
            continue;
        };

        match msg.view() {
            gst::MessageView::Eos(_) if looping.load(Ordering::SeqCst) => {
                debug!("Restarting preview for loop");
                if let Err(e) = playbin.seek_simple(
                    gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
                    gst::ClockTime::ZERO,
                ) {
                    warn!(?e, "Preview seek failed");
                }
            }
            gst::MessageView::Eos(_) => {
                debug!("Preview reached the end");
                let _ = playbin.set_state(gst::State::Paused);
            }
            gst::MessageView::Error(err) => {
                warn!(error = %err.error(), debug = ?err.debug(), "Preview playback failed");
                return;
            }
            _ => {}
        }
    }
}
