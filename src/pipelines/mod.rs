// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer capture pipelines
//!
//! - `photo`: grab one settled frame and write a JPEG
//! - `video`: encoder selection and the recording pipeline

pub mod photo;
pub mod video;
