//! Error types for visionloop

use thiserror::Error;

use crate::engine::Delegate;

/// Main error type for visionloop
#[derive(Error, Debug)]
pub enum VisionLoopError {
    #[error("Model load error: {0}")]
    ModelLoad(#[from] ModelLoadError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Precondition error: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Model initialization errors
///
/// `DelegateUnavailable` for the accelerated delegate is recoverable: the
/// session retries with the CPU delegate before declaring the load failed.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("{delegate} delegate unavailable: {reason}")]
    DelegateUnavailable { delegate: Delegate, reason: String },

    #[error("Failed to load model '{asset}': {reason}")]
    LoadFailed { asset: String, reason: String },
}

/// Camera acquisition errors
///
/// All variants are recoverable: the controller stays Idle and the user may
/// retry.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Per-frame inference errors
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Inference session is not ready")]
    SessionNotReady,

    #[error("Inference backend error: {0}")]
    Backend(String),

    #[error("Failed to switch running mode: {0}")]
    ModeSwitch(String),
}

/// Violated caller preconditions
///
/// Raised when capture is toggled before the model session is usable. These
/// carry a user-facing message and cause no state change.
#[derive(Error, Debug)]
pub enum PreconditionError {
    #[error("Model is still loading, try again shortly")]
    ModelLoading,

    #[error("Model failed to load: {0}")]
    ModelFailed(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Overlay rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Node host error: {0}")]
    Host(String),
}

/// Result type alias for visionloop operations
pub type Result<T> = std::result::Result<T, VisionLoopError>;
