// SPDX-License-Identifier: MPL-2.0

//! Video recording pipeline
//!
//! The recorder is built from a launch description, started, and then
//! handed to a watcher thread that owns it until the bus reports EOS or an
//! error. The watcher reports the outcome through a
//! [`RecordingCompletion`]; the returned [`RecordingHandle`] can only ask
//! the pipeline to wind down.

use super::encoder_selection::{SelectedEncoders, select_encoders};
use crate::backends::camera::{DeviceSource, RecordingCompletion};
use crate::constants::timing;
use crate::errors::CaptureError;
use gstreamer as gst;
use gstreamer::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Recording parameters
#[derive(Debug, Clone)]
pub struct VideoRecorderConfig<'a> {
    pub source: &'a DeviceSource,
    /// Output path; the extension is replaced to match the container
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub framerate: u32,
    pub bitrate_kbps: u32,
    pub enable_audio: bool,
}

/// A built, not yet running recording pipeline
#[derive(Debug)]
pub struct VideoRecorder {
    pipeline: gst::Pipeline,
    file_path: PathBuf,
}

/// Control handle of a running recording
#[derive(Debug, Clone)]
pub struct RecordingHandle {
    pipeline: gst::Pipeline,
    stop_requested: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl VideoRecorder {
    pub fn new(config: VideoRecorderConfig<'_>) -> Result<Self, CaptureError> {
        gst::init().map_err(|e| {
            CaptureError::StartFailed(format!("Failed to initialize GStreamer: {}", e))
        })?;

        let encoders = select_encoders(config.enable_audio)?;
        let file_path = config
            .output_path
            .with_extension(encoders.container.extension());

        let description = pipeline_description(&config, &encoders, &file_path);
        info!(
            source = %config.source,
            output = %file_path.display(),
            width = config.width,
            height = config.height,
            framerate = config.framerate,
            audio = encoders.audio_encoder.is_some(),
            "Creating video recorder"
        );
        debug!(pipeline = %description, "Recording pipeline");

        let pipeline = gst::parse::launch(&description)
            .map_err(|e| CaptureError::StartFailed(format!("Failed to create pipeline: {}", e)))?
            .downcast::<gst::Pipeline>()
            .map_err(|_| CaptureError::StartFailed("Failed to downcast to Pipeline".into()))?;

        Ok(Self {
            pipeline,
            file_path,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Start recording and hand the pipeline to a watcher thread
    pub fn start(self, completion: RecordingCompletion) -> Result<RecordingHandle, CaptureError> {
        info!("Starting video recording");
        if let Err(e) = self.pipeline.set_state(gst::State::Playing) {
            let _ = self.pipeline.set_state(gst::State::Null);
            return Err(CaptureError::StartFailed(e.to_string()));
        }

        // Check for immediate errors
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| CaptureError::StartFailed("No bus available".into()))?;
        if let Some(msg) = bus.timed_pop_filtered(
            gst::ClockTime::from_mseconds(timing::PIPELINE_START_CHECK_MS),
            &[gst::MessageType::Error],
        ) && let gst::MessageView::Error(err) = msg.view()
        {
            error!(
                error = %err.error(),
                debug = ?err.debug(),
                source = ?err.src().map(|s| s.name()),
                "GStreamer error during start"
            );
            let _ = self.pipeline.set_state(gst::State::Null);
            return Err(CaptureError::StartFailed(err.error().to_string()));
        }

        let handle = RecordingHandle {
            pipeline: self.pipeline.clone(),
            stop_requested: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
        };
        let stop_requested = Arc::clone(&handle.stop_requested);
        let finished = Arc::clone(&handle.finished);

        std::thread::Builder::new()
            .name("recording-watcher".into())
            .spawn(move || {
                let outcome = self.watch(bus, &stop_requested);
                let _ = self.pipeline.set_state(gst::State::Null);
                finished.store(true, Ordering::SeqCst);
                match outcome {
                    Ok(path) => completion.finish(path),
                    Err(e) => completion.fail(e),
                }
            })
            .map_err(|e| CaptureError::StartFailed(format!("Failed to spawn watcher: {}", e)))?;

        Ok(handle)
    }

    /// Wait for EOS or an error
    fn watch(&self, bus: gst::Bus, stop_requested: &AtomicBool) -> Result<String, CaptureError> {
        let mut stop_deadline: Option<Instant> = None;

        loop {
            if stop_deadline.is_none() && stop_requested.load(Ordering::SeqCst) {
                stop_deadline =
                    Some(Instant::now() + Duration::from_secs(timing::STOP_TIMEOUT_SECS));
            }

            if stop_deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!("Recording did not reach EOS in time, forcing pipeline down");
                return Err(CaptureError::Timeout);
            }

            let Some(msg) = bus.timed_pop_filtered(
                gst::ClockTime::from_mseconds(timing::BUS_POLL_INTERVAL_MS),
                &[gst::MessageType::Eos, gst::MessageType::Error],
            ) else {
                continue;
            };

            match msg.view() {
                gst::MessageView::Eos(_) => {
                    info!(path = %self.file_path.display(), "Recording saved");
                    return Ok(self.file_path.display().to_string());
                }
                gst::MessageView::Error(err) => {
                    error!(
                        error = %err.error(),
                        debug = ?err.debug(),
                        source = ?err.src().map(|s| s.name()),
                        "GStreamer error during recording"
                    );
                    return Err(CaptureError::PipelineError(err.error().to_string()));
                }
                _ => {}
            }
        }
    }
}

impl RecordingHandle {
    /// Whether the watcher has reported an outcome
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Send EOS so the muxer can finalize the file
    pub fn request_stop(&self) -> Result<(), CaptureError> {
        info!("Sending EOS to recording pipeline");
        self.stop_requested.store(true, Ordering::SeqCst);
        if self.pipeline.send_event(gst::event::Eos::new()) {
            Ok(())
        } else {
            Err(CaptureError::StopFailed(
                "pipeline rejected the EOS event".to_string(),
            ))
        }
    }
}

fn pipeline_description(
    config: &VideoRecorderConfig<'_>,
    encoders: &SelectedEncoders,
    file_path: &Path,
) -> String {
    let decode = match config.source {
        DeviceSource::V4l2 { .. } => " ! decodebin",
        _ => "",
    };
    let parser = encoders
        .parser
        .map(|p| format!(" ! {}", p))
        .unwrap_or_default();

    let mut description = format!(
        "{src}{decode} ! queue ! videoconvert ! videoscale ! videorate ! \
         video/x-raw,width={w},height={h},framerate={fps}/1 ! \
         {encoder}{parser} ! queue ! {muxer} name=mux ! filesink location=\"{path}\"",
        src = config.source.video_source_description(),
        decode = decode,
        w = config.width,
        h = config.height,
        fps = config.framerate,
        encoder = encoders.video_encoder_description(config.bitrate_kbps),
        parser = parser,
        muxer = encoders.container.muxer(),
        path = file_path.display(),
    );

    if let Some(audio_encoder) = encoders.audio_encoder {
        description.push_str(&format!(
            " {} ! queue ! audioconvert ! audioresample ! {} ! queue ! mux.",
            config.source.audio_source_description(),
            audio_encoder
        ));
    }

    description
}

#[cfg(test)]
mod tests {
    use super::super::encoder_selection::Container;
    use super::*;

    fn encoders(audio: Option<&'static str>) -> SelectedEncoders {
        SelectedEncoders {
            video_encoder: "x264enc",
            parser: Some("h264parse"),
            container: Container::Mp4,
            audio_encoder: audio,
        }
    }

    fn config(source: &DeviceSource) -> VideoRecorderConfig<'_> {
        VideoRecorderConfig {
            source,
            output_path: PathBuf::from("/tmp/VID_1"),
            width: 1280,
            height: 720,
            framerate: 30,
            bitrate_kbps: 5_000,
            enable_audio: true,
        }
    }

    #[test]
    fn audio_branch_joins_muxer() {
        let source = DeviceSource::TestPattern {
            pattern: "ball".to_string(),
        };
        let description = pipeline_description(
            &config(&source),
            &encoders(Some("avenc_aac")),
            Path::new("/tmp/VID_1.mp4"),
        );
        assert!(description.starts_with("videotestsrc is-live=true pattern=ball"));
        assert!(description.contains("mp4mux name=mux"));
        assert!(description.contains("audiotestsrc"));
        assert!(description.ends_with("avenc_aac ! queue ! mux."));
    }

    #[test]
    fn video_only_without_audio_encoder() {
        let source = DeviceSource::PipeWire {
            serial: "71".to_string(),
        };
        let description =
            pipeline_description(&config(&source), &encoders(None), Path::new("/tmp/VID_1.mp4"));
        assert!(description.contains("pipewiresrc target-object=71"));
        assert!(!description.contains("mux."));
        assert!(description.contains("bitrate=5000"));
    }
}
