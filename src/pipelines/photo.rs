// SPDX-License-Identifier: GPL-3.0-only

//! Single photo capture
//!
//! Opens the camera with an RGB appsink, lets it warm up so exposure
//! settles, keeps the latest frame and writes it as JPEG. Blocking; run it
//! on a blocking task.

use crate::backends::camera::DeviceSource;
use crate::constants::timing;
use crate::errors::CaptureError;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Capture one frame from `source` and save it to `output` as JPEG
pub fn capture_jpeg(
    source: &DeviceSource,
    output: &Path,
    warmup: Duration,
) -> Result<PathBuf, CaptureError> {
    gst::init().map_err(|e| CaptureError::PhotoFailed(format!("GStreamer init: {}", e)))?;

    let description = photo_pipeline_description(source);
    debug!(pipeline = %description, "Creating photo pipeline");

    let pipeline = gst::parse::launch(&description)
        .map_err(|e| CaptureError::PhotoFailed(format!("Failed to create pipeline: {}", e)))?
        .downcast::<gst::Pipeline>()
        .map_err(|_| CaptureError::PhotoFailed("Failed to downcast to Pipeline".into()))?;

    let appsink = pipeline
        .by_name("sink")
        .and_then(|e| e.downcast::<gst_app::AppSink>().ok())
        .ok_or_else(|| CaptureError::PhotoFailed("Failed to find appsink".into()))?;

    pipeline
        .set_state(gst::State::Playing)
        .map_err(|e| CaptureError::PhotoFailed(format!("Failed to start camera: {}", e)))?;

    let result = pull_settled_sample(&pipeline, &appsink, warmup);
    let _ = pipeline.set_state(gst::State::Null);

    let image = sample_to_rgb(&result?)?;
    image
        .save_with_format(output, image::ImageFormat::Jpeg)
        .map_err(|e| CaptureError::PhotoFailed(format!("Failed to write JPEG: {}", e)))?;

    info!(path = %output.display(), "Photo saved");
    Ok(output.to_path_buf())
}

fn photo_pipeline_description(source: &DeviceSource) -> String {
    let decode = match source {
        DeviceSource::V4l2 { .. } => " ! decodebin",
        _ => "",
    };
    format!(
        "{}{} ! videoconvert ! video/x-raw,format=RGB ! \
         appsink name=sink max-buffers=1 drop=true sync=false",
        source.video_source_description(),
        decode
    )
}

/// Keep pulling frames until the warm-up period has passed
fn pull_settled_sample(
    pipeline: &gst::Pipeline,
    appsink: &gst_app::AppSink,
    warmup: Duration,
) -> Result<gst::Sample, CaptureError> {
    let bus = pipeline
        .bus()
        .ok_or_else(|| CaptureError::PhotoFailed("No bus available".into()))?;

    let start = Instant::now();
    let deadline = warmup + Duration::from_secs(timing::PHOTO_TIMEOUT_SECS);
    let mut latest: Option<gst::Sample> = None;

    while start.elapsed() < deadline {
        if let Some(msg) = bus.pop_filtered(&[gst::MessageType::Error])
            && let gst::MessageView::Error(err) = msg.view()
        {
            error!(
                error = %err.error(),
                debug = ?err.debug(),
                "GStreamer error during photo capture"
            );
            return Err(CaptureError::PhotoFailed(err.error().to_string()));
        }

        if let Some(sample) = appsink.try_pull_sample(gst::ClockTime::from_mseconds(
            timing::BUS_POLL_INTERVAL_MS,
        )) {
            latest = Some(sample);
        }

        if start.elapsed() >= warmup
            && let Some(sample) = latest.take()
        {
            return Ok(sample);
        }
    }

    Err(CaptureError::Timeout)
}

fn sample_to_rgb(sample: &gst::Sample) -> Result<image::RgbImage, CaptureError> {
    let caps = sample
        .caps()
        .ok_or_else(|| CaptureError::PhotoFailed("Frame without caps".into()))?;
    let info = gstreamer_video::VideoInfo::from_caps(caps)
        .map_err(|e| CaptureError::PhotoFailed(format!("Unsupported frame caps: {}", e)))?;
    let buffer = sample
        .buffer()
        .ok_or_else(|| CaptureError::PhotoFailed("Frame without buffer".into()))?;
    let map = buffer
        .map_readable()
        .map_err(|_| CaptureError::PhotoFailed("Failed to map frame".into()))?;

    let (width, height) = (info.width(), info.height());
    let stride = info.stride()[0] as usize;
    let rgb = pack_rows(map.as_slice(), width as usize, height as usize, stride)
        .ok_or_else(|| CaptureError::PhotoFailed("Truncated frame".into()))?;

    image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| CaptureError::PhotoFailed("Failed to create image".into()))
}

/// Drop per-row padding from a packed RGB frame
fn pack_rows(data: &[u8], width: usize, height: usize, stride: usize) -> Option<Vec<u8>> {
    let row_len = width * 3;
    let mut rgb = Vec::with_capacity(row_len * height);
    for y in 0..height {
        let start = y * stride;
        rgb.extend_from_slice(data.get(start..start + row_len)?);
    }
    Some(rgb)
}
