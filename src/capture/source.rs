//! Media sources and video feeds
//!
//! A [`MediaSource`] hands out a stream of camera tracks plus a
//! [`VideoFeed`] that exposes the current video sample. The feed is a
//! pull-based surface: the loop polls it once per tick and decides from the
//! sample timestamp whether the decoder has advanced. [`SyntheticCamera`]
//! generates frames on the tokio clock for headless runs and tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::CaptureConfig;
use crate::detection::{Frame, FrameSize};
use crate::error::CaptureError;

/// Video-only constraint set for opening a media source
#[derive(Debug, Clone)]
pub struct StreamConstraints {
    /// Device name or "default"
    pub device: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl From<&CaptureConfig> for StreamConstraints {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            device: config.device.clone(),
            width: config.width,
            height: config.height,
            fps: config.fps,
        }
    }
}

/// One live media track; stopping is permanent
#[derive(Debug, Clone)]
pub struct MediaTrack {
    kind: &'static str,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    pub(crate) fn video() -> Self {
        Self {
            kind: "video",
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn stop(&self) {
        self.live.store(false, Ordering::Relaxed);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Relaxed)
    }
}

/// A set of live tracks from one `open` call
#[derive(Debug)]
pub struct MediaStream {
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub(crate) fn new(tracks: Vec<MediaTrack>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// Stop every track in the stream
    pub fn stop_tracks(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

/// Current-sample surface of an attached stream
pub trait VideoFeed {
    /// The feed's current sample; its timestamp advances as frames decode
    fn current_frame(&self) -> Frame;
}

/// A camera device that can be opened into a stream plus feed
pub trait MediaSource {
    type Feed: VideoFeed;

    /// Request camera access.
    ///
    /// Permission and device failures are recoverable: the caller stays
    /// idle and the user may retry.
    async fn open(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<(MediaStream, Self::Feed), CaptureError>;
}

/// Clock-driven synthetic camera.
///
/// Frames advance at the configured rate on the tokio clock, so paused-time
/// tests control exactly when a new timestamp appears.
pub struct SyntheticCamera {
    deny_permission: bool,
    device_missing: bool,
    issued_tracks: Arc<Mutex<Vec<MediaTrack>>>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            deny_permission: false,
            device_missing: false,
            issued_tracks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Simulate the user denying the camera permission prompt
    pub fn with_deny_permission(mut self, deny: bool) -> Self {
        self.deny_permission = deny;
        self
    }

    /// Simulate the configured device not existing
    pub fn with_device_missing(mut self, missing: bool) -> Self {
        self.device_missing = missing;
        self
    }

    /// Handle to every track this camera has issued; stays observable
    /// after streams are released
    pub fn issued_tracks(&self) -> Arc<Mutex<Vec<MediaTrack>>> {
        Arc::clone(&self.issued_tracks)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSource for SyntheticCamera {
    type Feed = SyntheticFeed;

    async fn open(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<(MediaStream, Self::Feed), CaptureError> {
        if self.deny_permission {
            return Err(CaptureError::PermissionDenied);
        }
        if self.device_missing {
            return Err(CaptureError::DeviceUnavailable(constraints.device.clone()));
        }

        let track = MediaTrack::video();
        if let Ok(mut issued) = self.issued_tracks.lock() {
            issued.push(track.clone());
        }

        let feed = SyntheticFeed::new(constraints);
        Ok((MediaStream::new(vec![track]), feed))
    }
}

/// Feed of a [`SyntheticCamera`] stream
#[derive(Debug)]
pub struct SyntheticFeed {
    started: tokio::time::Instant,
    period_ms: u64,
    size: FrameSize,
}

impl SyntheticFeed {
    fn new(constraints: &StreamConstraints) -> Self {
        Self {
            started: tokio::time::Instant::now(),
            // Timestamps are millisecond-grained, so the period floors at 1 ms
            period_ms: (1000 / constraints.fps.max(1)).max(1) as u64,
            size: FrameSize::new(constraints.width, constraints.height),
        }
    }
}

impl VideoFeed for SyntheticFeed {
    fn current_frame(&self) -> Frame {
        // Quantize elapsed time to the frame period: polls within one
        // period observe the same timestamp.
        let elapsed = self.started.elapsed().as_millis() as u64;
        let index = elapsed / self.period_ms;
        Frame {
            id: index,
            timestamp_ms: index * self.period_ms,
            size: self.size,
        }
    }
}

#[cfg(test)]
pub(crate) use manual::{ManualFeed, ManualSource};

#[cfg(test)]
mod manual {
    use super::*;
    use std::sync::atomic::AtomicU64;

    /// Test source whose feed reports exactly the timestamp the test sets
    pub(crate) struct ManualSource {
        timestamp: Arc<AtomicU64>,
        size: FrameSize,
    }

    impl ManualSource {
        pub fn new(size: FrameSize) -> (Self, Arc<AtomicU64>) {
            let timestamp = Arc::new(AtomicU64::new(0));
            (
                Self {
                    timestamp: Arc::clone(&timestamp),
                    size,
                },
                timestamp,
            )
        }
    }

    impl MediaSource for ManualSource {
        type Feed = ManualFeed;

        async fn open(
            &mut self,
            _constraints: &StreamConstraints,
        ) -> Result<(MediaStream, Self::Feed), CaptureError> {
            let feed = ManualFeed {
                timestamp: Arc::clone(&self.timestamp),
                size: self.size,
            };
            Ok((MediaStream::new(vec![MediaTrack::video()]), feed))
        }
    }

    pub(crate) struct ManualFeed {
        timestamp: Arc<AtomicU64>,
        size: FrameSize,
    }

    impl VideoFeed for ManualFeed {
        fn current_frame(&self) -> Frame {
            let timestamp_ms = self.timestamp.load(Ordering::Relaxed);
            Frame {
                id: timestamp_ms,
                timestamp_ms,
                size: self.size,
            }
        }
    }
}
