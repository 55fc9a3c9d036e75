// SPDX-License-Identifier: MPL-2.0

//! Video recording pipeline

pub mod encoder_selection;
pub mod recorder;

pub use encoder_selection::{Container, SelectedEncoders, select_encoders};
pub use recorder::{RecordingHandle, VideoRecorder, VideoRecorderConfig};
