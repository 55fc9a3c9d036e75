// SPDX-License-Identifier: MPL-2.0

//! Capture Screen - take photos and record videos, preview, save to gallery
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: The capture screen controller, its state machine and event loop
//! - [`backends`]: Camera discovery, permissions and the camera engine
//! - [`pipelines`]: GStreamer photo and video capture pipelines
//! - [`media`]: Preview playback of recorded clips
//! - [`storage`]: Capture cache and gallery persistence
//! - [`config`]: User configuration handling
//! - [`terminal`]: Interactive terminal front end
//!
//! The controller only talks to its collaborators through the
//! [`backends::camera::CameraEngine`], [`storage::MediaLibrary`] and
//! [`media::VideoPlayer`] traits, so it can run against in-memory
//! implementations.

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{CaptureScreen, CaptureState, CapturedMedia, EventLoop, Message, Task};
pub use config::Config;
pub use constants::BitratePreset;
pub use errors::{AppError, AppResult};
