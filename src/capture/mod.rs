//! Camera capture
//!
//! Media source seam, stream/track handles, and the enable/disable
//! controller that owns them.

pub mod controller;
pub mod source;

pub use controller::{CaptureController, CaptureState};
pub use source::{
    MediaSource, MediaStream, MediaTrack, StreamConstraints, SyntheticCamera, SyntheticFeed,
    VideoFeed,
};
