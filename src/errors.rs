// SPDX-License-Identifier: MPL-2.0

//! Error types for the capture screen
//!
//! Every collaborator failure is converted into one of these types at the
//! controller boundary. None of them is fatal: the screen logs them and stays
//! in a recoverable state.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Camera discovery or backend errors
    Camera(CameraError),
    /// Recording or photo capture errors
    Capture(CaptureError),
    /// Gallery save errors
    Save(SaveError),
    /// A capability was not granted
    Permission(PermissionError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// No camera devices found
    NoCameraFound,
    /// Camera initialization failed
    InitializationFailed(String),
    /// Backend error (e.g., PipeWire, V4L2)
    BackendError(String),
}

/// Errors reported by the capture engine while recording or taking a photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Failed to start recording
    StartFailed(String),
    /// Failed to request the end of a recording
    StopFailed(String),
    /// No usable encoder was found
    EncoderNotAvailable(String),
    /// Pipeline error during recording
    PipelineError(String),
    /// Photo capture failed
    PhotoFailed(String),
    /// Stop was requested without an active recording
    NoActiveRecording,
    /// The engine did not answer in time
    Timeout,
    /// Failure reported verbatim by the engine
    Engine(String),
}

/// Media library errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// The path does not point to a saveable capture
    InvalidPath(String),
    /// Copying into the gallery failed
    Io(String),
    /// Media library access was not granted
    PermissionDenied,
}

/// Capability grants that were refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// Camera access denied
    CameraDenied,
    /// No microphone access
    MicrophoneDenied,
    /// Gallery folders cannot be written
    MediaLibraryDenied,
    /// The desktop portal could not be reached
    PortalUnavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Save(e) => write!(f, "Save error: {}", e),
            AppError::Permission(e) => write!(f, "Permission denied: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            CameraError::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::StartFailed(msg) => write!(f, "Failed to start recording: {}", msg),
            CaptureError::StopFailed(msg) => write!(f, "Failed to stop recording: {}", msg),
            CaptureError::EncoderNotAvailable(msg) => write!(f, "Encoder not available: {}", msg),
            CaptureError::PipelineError(msg) => write!(f, "Pipeline error: {}", msg),
            CaptureError::PhotoFailed(msg) => write!(f, "Photo capture failed: {}", msg),
            CaptureError::NoActiveRecording => write!(f, "No recording in progress"),
            CaptureError::Timeout => write!(f, "Camera did not respond in time"),
            CaptureError::Engine(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::InvalidPath(msg) => write!(f, "Invalid media path: {}", msg),
            SaveError::Io(msg) => write!(f, "I/O error: {}", msg),
            SaveError::PermissionDenied => write!(f, "Media library access denied"),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::CameraDenied => write!(f, "camera"),
            PermissionError::MicrophoneDenied => write!(f, "microphone"),
            PermissionError::MediaLibraryDenied => write!(f, "media library"),
            PermissionError::PortalUnavailable(msg) => {
                write!(f, "desktop portal unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for SaveError {}
impl std::error::Error for PermissionError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<SaveError> for AppError {
    fn from(err: SaveError) -> Self {
        AppError::Save(err)
    }
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        SaveError::Io(err.to_string())
    }
}

impl From<zbus::Error> for PermissionError {
    fn from(err: zbus::Error) -> Self {
        PermissionError::PortalUnavailable(err.to_string())
    }
}
