//! Tick-driven inference pipeline
//!
//! The loop fires once per display refresh tick. Each tick polls the
//! capture feed, skips frames whose timestamp has not advanced, runs
//! inference on new frames and hands the result to the overlay renderer
//! and label panel. Idle ticks keep the loop alive until capture first
//! becomes active; once it has been active, an observed transition back to
//! idle ends the run. Per-frame failures are logged and isolated, never
//! fatal to the loop.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::capture::{CaptureController, MediaSource};
use crate::config::{Config, PipelineVariant};
use crate::detection::{DetectionResult, Frame};
use crate::engine::{InferenceEngine, ModelSession};
use crate::error::Result;
use crate::expression::ExpressionClassifier;
use crate::overlay::{LabelPanel, OverlayRenderer};

/// Counters accumulated over one run of the loop
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopStats {
    /// Ticks observed, including idle and duplicate ones
    pub ticks: u64,
    /// Frames inferred and rendered
    pub frames_processed: u64,
    /// Ticks skipped because the feed's timestamp had not advanced
    pub duplicates_skipped: u64,
    /// Ticks observed while capture was not active
    pub idle_ticks: u64,
    /// Per-frame inference failures that were isolated
    pub inference_errors: u64,
    /// Per-frame render failures that were isolated
    pub render_errors: u64,
    /// Results that arrived after capture went idle and were dropped
    pub discarded_results: u64,
}

/// Per-frame polling driver wiring capture, inference and rendering.
///
/// Owns all per-run state (last processed timestamp, counters) so nothing
/// leaks across runs or lives in globals.
pub struct InferenceLoop<S: MediaSource, E: InferenceEngine> {
    session: ModelSession<E>,
    capture: CaptureController<S>,
    renderer: Box<dyn OverlayRenderer + Send>,
    panel: LabelPanel,
    classifier: Option<ExpressionClassifier>,
    mirrored: bool,
    tick_interval: Duration,
    max_frames: Option<u64>,
    last_timestamp: Option<u64>,
    stats: LoopStats,
}

impl<S: MediaSource, E: InferenceEngine> InferenceLoop<S, E> {
    pub fn new(
        session: ModelSession<E>,
        capture: CaptureController<S>,
        renderer: Box<dyn OverlayRenderer + Send>,
        config: &Config,
    ) -> Self {
        let classifier = if config.pipeline.classify_expression
            && config.pipeline.variant == PipelineVariant::FaceLandmarker
        {
            Some(ExpressionClassifier::new(config.expression.clone()))
        } else {
            None
        };

        Self {
            session,
            capture,
            renderer,
            panel: LabelPanel::new(),
            classifier,
            mirrored: config.capture.mirrored,
            tick_interval: tick_interval(config.display.refresh_hz),
            max_frames: None,
            last_timestamp: None,
            stats: LoopStats::default(),
        }
    }

    /// Stop after this many processed frames; `None` runs until disable
    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn session(&self) -> &ModelSession<E> {
        &self.session
    }

    pub fn panel(&self) -> &LabelPanel {
        &self.panel
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Drive the loop until capture is explicitly disabled, the configured
    /// frame budget is reached, or a shutdown signal arrives.
    ///
    /// An in-flight inference is never aborted: shutdown and disable take
    /// effect between ticks, and a result that completes after capture went
    /// idle is discarded instead of rendered.
    pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<LoopStats> {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut was_active = false;

        tracing::info!(
            "Inference loop running at {:.1} ms per tick",
            self.tick_interval.as_secs_f64() * 1000.0
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.stats.ticks += 1;
                    if !self.tick(&mut was_active).await? {
                        break;
                    }
                    if let Some(max) = self.max_frames {
                        if self.stats.frames_processed >= max {
                            tracing::info!("Frame budget of {} reached", max);
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Inference loop shutting down");
                    break;
                }
            }
        }

        self.renderer.clear()?;
        self.panel.hide();
        tracing::info!(
            "Loop finished: {} frames, {} duplicates skipped, {} idle ticks, {} errors",
            self.stats.frames_processed,
            self.stats.duplicates_skipped,
            self.stats.idle_ticks,
            self.stats.inference_errors + self.stats.render_errors
        );
        Ok(self.stats)
    }

    /// One tick; returns false when the loop should stop
    async fn tick(&mut self, was_active: &mut bool) -> Result<bool> {
        if !self.capture.is_active().await {
            if *was_active {
                tracing::info!("Capture disabled, loop stopping");
                return Ok(false);
            }
            // Keep polling so the loop resumes once capture is enabled
            self.stats.idle_ticks += 1;
            return Ok(true);
        }
        *was_active = true;

        let Some(frame) = self.capture.current_frame().await else {
            self.stats.idle_ticks += 1;
            return Ok(true);
        };

        if let Err(e) = self.session.ensure_video_mode().await {
            self.stats.inference_errors += 1;
            tracing::warn!("Running mode switch failed: {}", e);
            return Ok(true);
        }

        if self.last_timestamp == Some(frame.timestamp_ms) {
            self.stats.duplicates_skipped += 1;
            return Ok(true);
        }
        // Recorded before inferring so a failed frame is not retried
        self.last_timestamp = Some(frame.timestamp_ms);

        match self.session.infer(frame).await {
            Ok(result) => {
                if !self.capture.is_active().await {
                    // Capture went idle while inference was in flight
                    self.stats.discarded_results += 1;
                    tracing::debug!(
                        "Discarding result for frame at {} ms: capture idle",
                        frame.timestamp_ms
                    );
                    return Ok(true);
                }
                self.render_result(&result, frame);
            }
            Err(e) => {
                self.stats.inference_errors += 1;
                tracing::warn!("Inference failed at {} ms: {}", frame.timestamp_ms, e);
            }
        }

        Ok(true)
    }

    fn render_result(&mut self, result: &DetectionResult, frame: Frame) {
        if let Err(e) = self.renderer.render(result, frame.size) {
            self.stats.render_errors += 1;
            tracing::warn!("Render failed at {} ms: {}", frame.timestamp_ms, e);
            return;
        }

        let expression = self
            .classifier
            .as_ref()
            .map(|c| c.classify_primary(result));
        self.panel.update(result, self.mirrored, expression);
        self.stats.frames_processed += 1;
    }
}

fn tick_interval(refresh_hz: u32) -> Duration {
    // Fractional seconds keep the period non-zero for rates above 1 kHz
    Duration::from_secs_f64(1.0 / f64::from(refresh_hz.max(1)))
}
