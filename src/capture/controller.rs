//! Capture enable/disable control
//!
//! Owns the camera stream exclusively: no other component stops or reads
//! its tracks directly. Enabling requests camera access and attaches the
//! feed; disabling stops every track and releases the stream. Both are
//! safe to repeat, and the user-facing label always derives from the
//! current state.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::capture::source::{MediaSource, MediaStream, StreamConstraints};
use crate::capture::VideoFeed;
use crate::config::CaptureConfig;
use crate::detection::Frame;
use crate::error::CaptureError;

/// Whether a camera stream is currently attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Active,
}

struct Inner<S: MediaSource> {
    source: S,
    state: CaptureState,
    stream: Option<MediaStream>,
    feed: Option<S::Feed>,
}

/// Camera lifecycle controller.
///
/// Cheap to clone; clones share the same stream and state.
pub struct CaptureController<S: MediaSource> {
    inner: Arc<RwLock<Inner<S>>>,
    constraints: StreamConstraints,
}

impl<S: MediaSource> Clone for CaptureController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            constraints: self.constraints.clone(),
        }
    }
}

impl<S: MediaSource> CaptureController<S> {
    pub fn new(source: S, config: &CaptureConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                source,
                state: CaptureState::Idle,
                stream: None,
                feed: None,
            })),
            constraints: StreamConstraints::from(config),
        }
    }

    pub async fn state(&self) -> CaptureState {
        self.inner.read().await.state
    }

    pub async fn is_active(&self) -> bool {
        self.state().await == CaptureState::Active
    }

    /// User-facing toggle label for the current state
    pub async fn label(&self) -> &'static str {
        match self.state().await {
            CaptureState::Idle => "ENABLE WEBCAM",
            CaptureState::Active => "DISABLE WEBCAM",
        }
    }

    /// Request camera access and attach the feed.
    ///
    /// Permission and device failures leave the state Idle and are
    /// recoverable: the user may simply try again.
    pub async fn enable(&self) -> Result<CaptureState, CaptureError> {
        let mut inner = self.inner.write().await;
        if inner.state == CaptureState::Active {
            tracing::debug!("Capture already active");
            return Ok(CaptureState::Active);
        }

        let (stream, feed) = inner.source.open(&self.constraints).await?;
        tracing::info!(
            "Capture enabled: {} {}x{} @ {} fps",
            self.constraints.device,
            self.constraints.width,
            self.constraints.height,
            self.constraints.fps
        );

        inner.stream = Some(stream);
        inner.feed = Some(feed);
        inner.state = CaptureState::Active;
        Ok(CaptureState::Active)
    }

    /// Stop all tracks and release the stream; a no-op while Idle
    pub async fn disable(&self) -> CaptureState {
        let mut inner = self.inner.write().await;
        if inner.state == CaptureState::Idle {
            return CaptureState::Idle;
        }

        if let Some(stream) = inner.stream.take() {
            stream.stop_tracks();
        }
        inner.feed = None;
        inner.state = CaptureState::Idle;
        tracing::info!("Capture disabled, stream released");
        CaptureState::Idle
    }

    /// Flip between enabled and disabled
    pub async fn toggle(&self) -> Result<CaptureState, CaptureError> {
        match self.state().await {
            CaptureState::Idle => self.enable().await,
            CaptureState::Active => Ok(self.disable().await),
        }
    }

    /// Current sample of the attached feed; `None` while Idle
    pub async fn current_frame(&self) -> Option<Frame> {
        let inner = self.inner.read().await;
        inner.feed.as_ref().map(|feed| feed.current_frame())
    }
}
