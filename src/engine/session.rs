//! Model session lifecycle
//!
//! Owns one engine session from creation to teardown. Initialization walks
//! the delegate preference (accelerated first, then general-purpose for
//! `auto`) and settles in `Ready` or `Failed`; inference is refused in any
//! other state instead of crashing the pipeline.

use crate::config::{DelegateChoice, EngineConfig, PipelineVariant};
use crate::detection::{DetectionResult, Frame};
use crate::engine::{Delegate, EngineFactory, InferenceEngine, RunningMode, SessionOptions};
use crate::error::{InferenceError, ModelLoadError, PreconditionError, VisionLoopError};

/// Lifecycle state of the model session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    Loading,
    /// Loaded and serving inference on the given delegate
    Ready(Delegate),
    Failed(String),
}

/// One engine session plus the state machine around it.
///
/// Sessions start in image mode; the first processed video frame switches
/// them to video mode through [`ModelSession::ensure_video_mode`].
pub struct ModelSession<E> {
    state: SessionState,
    engine: Option<E>,
    mode: RunningMode,
}

impl<E: InferenceEngine> ModelSession<E> {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unloaded,
            engine: None,
            mode: RunningMode::Image,
        }
    }

    /// Create the engine session, falling back across delegates.
    ///
    /// When the choice requests the accelerated delegate (`auto` or `gpu`)
    /// it is tried first and its refusal is recoverable: the walk retries
    /// on CPU and the session only settles in `Failed` when every attempted
    /// delegate refuses. `cpu` never attempts the accelerated delegate.
    pub async fn initialize<F>(
        &mut self,
        factory: &F,
        config: &EngineConfig,
        variant: PipelineVariant,
    ) -> Result<(), VisionLoopError>
    where
        F: EngineFactory<Engine = E>,
    {
        self.state = SessionState::Loading;

        let asset = config.model_asset(variant);
        let attempts: &[Delegate] = match config.delegate {
            DelegateChoice::Auto | DelegateChoice::Gpu => &[Delegate::Gpu, Delegate::Cpu],
            DelegateChoice::Cpu => &[Delegate::Cpu],
        };

        let mut last_error = None;
        for &delegate in attempts {
            let options = SessionOptions {
                model_asset: asset.clone(),
                delegate,
                running_mode: RunningMode::Image,
                num_faces: config.num_faces,
                num_hands: config.num_hands,
                output_blendshapes: config.output_blendshapes,
                min_confidence: config.min_confidence,
            };

            match factory.create_session(&options).await {
                Ok(engine) => {
                    tracing::info!(
                        "Model session ready: {} on {}",
                        asset.display(),
                        delegate
                    );
                    self.engine = Some(engine);
                    self.mode = RunningMode::Image;
                    self.state = SessionState::Ready(delegate);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Delegate {} unavailable: {}", delegate, e);
                    last_error = Some(e);
                }
            }
        }

        let reason = match last_error {
            Some(e) => e.to_string(),
            None => "no delegate attempted".to_string(),
        };
        self.state = SessionState::Failed(reason.clone());

        Err(ModelLoadError::LoadFailed {
            asset: asset.display().to_string(),
            reason,
        }
        .into())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// Delegate the session settled on, once ready
    pub fn delegate(&self) -> Option<Delegate> {
        match self.state {
            SessionState::Ready(delegate) => Some(delegate),
            _ => None,
        }
    }

    pub fn running_mode(&self) -> RunningMode {
        self.mode
    }

    /// Refuse use of the session before it is ready.
    ///
    /// Gates user-triggered capture toggles: still-loading and failed
    /// sessions produce a user-visible message, not a crash.
    pub fn ensure_ready(&self) -> Result<(), PreconditionError> {
        match &self.state {
            SessionState::Ready(_) => Ok(()),
            SessionState::Unloaded | SessionState::Loading => {
                Err(PreconditionError::ModelLoading)
            }
            SessionState::Failed(reason) => {
                Err(PreconditionError::ModelFailed(reason.clone()))
            }
        }
    }

    /// Switch to video semantics before the first video frame.
    ///
    /// Sessions are created in image mode; the loop calls this on every
    /// frame and it is a no-op once switched.
    pub async fn ensure_video_mode(&mut self) -> Result<(), InferenceError> {
        if self.mode == RunningMode::Video {
            return Ok(());
        }

        let engine = self.engine.as_mut().ok_or(InferenceError::SessionNotReady)?;
        engine.set_running_mode(RunningMode::Video).await?;
        self.mode = RunningMode::Video;
        tracing::debug!("Session switched to video running mode");
        Ok(())
    }

    /// Run inference on one frame; fails unless the session is ready
    pub async fn infer(&mut self, frame: Frame) -> Result<DetectionResult, InferenceError> {
        let engine = self.engine.as_mut().ok_or(InferenceError::SessionNotReady)?;
        engine.infer(frame).await
    }
}

impl<E: InferenceEngine> Default for ModelSession<E> {
    fn default() -> Self {
        Self::new()
    }
}
