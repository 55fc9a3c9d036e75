// SPDX-License-Identifier: MPL-2.0

//! Encoder selection for the recording pipeline
//!
//! Hardware H.264 encoders are preferred, then software H.264, then VP8 as a
//! last resort. The audio encoder must fit the chosen container.

use crate::errors::CaptureError;
use gstreamer as gst;
use tracing::{debug, info};

/// Container a recording is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    WebM,
}

impl Container {
    pub fn muxer(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4mux",
            Container::WebM => "webmmux",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::WebM => "webm",
        }
    }

    fn audio_encoders(&self) -> &'static [&'static str] {
        match self {
            Container::Mp4 => &["avenc_aac", "fdkaacenc", "voaacenc"],
            Container::WebM => &["opusenc", "vorbisenc"],
        }
    }
}

/// Video encoder candidates in priority order (element, container, parser)
const VIDEO_ENCODERS: &[(&str, Container, Option<&str>)] = &[
    ("vah264enc", Container::Mp4, Some("h264parse")),
    ("vaapih264enc", Container::Mp4, Some("h264parse")),
    ("nvh264enc", Container::Mp4, Some("h264parse")),
    ("v4l2h264enc", Container::Mp4, Some("h264parse")),
    ("x264enc", Container::Mp4, Some("h264parse")),
    ("openh264enc", Container::Mp4, Some("h264parse")),
    ("vp8enc", Container::WebM, None),
];

/// Encoders chosen for one recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEncoders {
    pub video_encoder: &'static str,
    pub parser: Option<&'static str>,
    pub container: Container,
    pub audio_encoder: Option<&'static str>,
}

impl SelectedEncoders {
    /// Launch fragment for the configured video encoder
    pub fn video_encoder_description(&self, bitrate_kbps: u32) -> String {
        match self.video_encoder {
            "x264enc" => format!(
                "x264enc tune=zerolatency speed-preset=veryfast bitrate={}",
                bitrate_kbps
            ),
            "openh264enc" => format!(
                "openh264enc rate-control=bitrate usage-type=camera bitrate={}",
                bitrate_kbps * 1000
            ),
            "vah264enc" => format!("vah264enc rate-control=cbr bitrate={}", bitrate_kbps),
            "vaapih264enc" | "nvh264enc" => {
                format!("{} bitrate={}", self.video_encoder, bitrate_kbps)
            }
            "vp8enc" => format!(
                "vp8enc deadline=1 target-bitrate={}",
                bitrate_kbps * 1000
            ),
            other => other.to_string(),
        }
    }
}

/// Select encoders among those GStreamer can instantiate
pub fn select_encoders(enable_audio: bool) -> Result<SelectedEncoders, CaptureError> {
    let selected = choose_encoders(
        |name| gst::ElementFactory::find(name).is_some(),
        enable_audio,
    )?;
    info!(
        video = selected.video_encoder,
        audio = ?selected.audio_encoder,
        container = ?selected.container,
        "Selected encoders"
    );
    Ok(selected)
}

/// Pick the first available video encoder and a matching audio encoder
pub fn choose_encoders(
    available: impl Fn(&str) -> bool,
    enable_audio: bool,
) -> Result<SelectedEncoders, CaptureError> {
    let (video_encoder, container, parser) = VIDEO_ENCODERS
        .iter()
        .copied()
        .find(|&(name, container, parser)| {
            available(name) && available(container.muxer()) && parser.is_none_or(&available)
        })
        .ok_or_else(|| {
            CaptureError::EncoderNotAvailable("no usable video encoder installed".to_string())
        })?;

    let audio_encoder = if enable_audio {
        let encoder = container
            .audio_encoders()
            .iter()
            .copied()
            .find(|name| available(name));
        if encoder.is_none() {
            debug!(container = ?container, "No audio encoder for container, recording video only");
        }
        encoder
    } else {
        None
    };

    Ok(SelectedEncoders {
        video_encoder,
        parser,
        container,
        audio_encoder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_h264_in_mp4() {
        let available = ["x264enc", "h264parse", "mp4mux", "avenc_aac", "vp8enc", "webmmux"];
        let selected = choose_encoders(|n| available.iter().any(|a| *a == n), true).unwrap();
        assert_eq!(selected.video_encoder, "x264enc");
        assert_eq!(selected.container, Container::Mp4);
        assert_eq!(selected.audio_encoder, Some("avenc_aac"));
    }

    #[test]
    fn falls_back_to_webm() {
        let available = ["vp8enc", "webmmux", "opusenc"];
        let selected = choose_encoders(|n| available.iter().any(|a| *a == n), true).unwrap();
        assert_eq!(selected.video_encoder, "vp8enc");
        assert_eq!(selected.container.extension(), "webm");
        assert_eq!(selected.audio_encoder, Some("opusenc"));
    }

    #[test]
    fn missing_parser_skips_encoder() {
        let available = ["x264enc", "mp4mux", "vp8enc", "webmmux"];
        let selected = choose_encoders(|n| available.iter().any(|a| *a == n), false).unwrap();
        assert_eq!(selected.video_encoder, "vp8enc");
        assert_eq!(selected.audio_encoder, None);
    }

    #[test]
    fn nothing_available_is_an_error() {
        assert!(matches!(
            choose_encoders(|_| false, true),
            Err(CaptureError::EncoderNotAvailable(_))
        ));
    }
}
