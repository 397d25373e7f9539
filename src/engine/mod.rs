//! Inference engine
//!
//! The vision engine is an external capability reached through two seams:
//! an [`EngineFactory`] that creates sessions for a model asset and compute
//! delegate, and the [`InferenceEngine`] session that runs per-frame
//! inference. [`session::ModelSession`] drives delegate fallback and the
//! lazy image-to-video mode switch on top of those seams; [`replay`] is the
//! built-in scripted engine used by the demo binary and the tests.

pub mod replay;
pub mod session;

pub use replay::{ReplayEngine, ReplayFactory, ReplayScript};
pub use session::{ModelSession, SessionState};

use std::path::PathBuf;

use crate::detection::{DetectionResult, Frame};
use crate::error::{InferenceError, ModelLoadError};

/// Compute backend a live session runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegate {
    /// Accelerated backend
    Gpu,
    /// General-purpose backend
    Cpu,
}

impl std::fmt::Display for Delegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Gpu => "GPU",
            Self::Cpu => "CPU",
        })
    }
}

/// Single-image vs streaming-video processing semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningMode {
    Image,
    Video,
}

/// Options handed to the factory when creating a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Model asset the session loads
    pub model_asset: PathBuf,
    /// Delegate this attempt targets
    pub delegate: Delegate,
    /// Mode the session starts in
    pub running_mode: RunningMode,
    /// Maximum faces to track
    pub num_faces: u32,
    /// Maximum hands to track
    pub num_hands: u32,
    /// Emit blendshape scores alongside face landmarks
    pub output_blendshapes: bool,
    /// Minimum detection confidence
    pub min_confidence: f32,
}

/// Creates engine sessions.
///
/// Creation is asynchronous and may fail per delegate; the caller decides
/// whether to retry with a different one.
pub trait EngineFactory {
    type Engine: InferenceEngine;

    async fn create_session(
        &self,
        options: &SessionOptions,
    ) -> Result<Self::Engine, ModelLoadError>;
}

/// A live engine session
pub trait InferenceEngine {
    /// Switch between single-image and video semantics
    async fn set_running_mode(&mut self, mode: RunningMode) -> Result<(), InferenceError>;

    /// Run inference on one video frame
    async fn infer(&mut self, frame: Frame) -> Result<DetectionResult, InferenceError>;
}
