// SPDX-License-Identifier: MPL-2.0

//! Playback of captured media
//!
//! The capture screen previews a finished recording through a
//! [`VideoPlayer`]. [`GstVideoPlayer`] plays files with GStreamer's
//! `playbin` in its own window and restarts them on EOS when looping.

pub mod player;

pub use player::{GstVideoPlayer, VideoPlayer};
