//! VisionLoop - Webcam Inference Pipeline Service
//!
//! A modular Rust service that runs vision models over a live capture feed:
//! - Face detection, face landmarking, and hand gesture recognition variants
//! - GPU-first model sessions with automatic CPU fallback
//! - Tick-driven inference with per-frame overlay rendering
//! - Canvas and DOM-node overlay strategies behind one interface

pub mod capture;
pub mod config;
pub mod detection;
pub mod engine;
pub mod error;
pub mod expression;
pub mod overlay;
pub mod pipeline;

pub use config::Config;
pub use error::{Result, VisionLoopError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
