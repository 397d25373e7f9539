//! Overlay rendering
//!
//! Turns one frame's detection results into visual artifacts over the video
//! region. Two strategies exist behind one interface: a canvas strategy that
//! clears and redraws a drawing surface, and a DOM strategy that manages
//! positioned nodes in an element tree. Artifacts live for exactly one
//! frame; no stale artifact may survive into the next render pass.

pub mod canvas;
pub mod dom;
pub mod geometry;
pub mod panel;
pub mod topology;

pub use canvas::{CanvasRenderer, SoftwareCanvas, Surface};
pub use dom::{DomRenderer, MemoryHost, NodeHost, NodeId, OverlayNode};
pub use geometry::{CoordinateMapper, DisplayPoint, DisplayRect, DisplaySize};
pub use panel::LabelPanel;

use crate::detection::{DetectionResult, FrameSize};
use crate::error::Result;

/// Strategy interface for drawing one frame's detections.
///
/// `render` must guarantee that every artifact of the previous frame is gone
/// before the current frame's artifacts appear, including when the current
/// result is empty.
pub trait OverlayRenderer {
    /// Replace the previous frame's artifacts with the current result's
    fn render(&mut self, result: &DetectionResult, frame: FrameSize) -> Result<()>;

    /// Remove everything this renderer has drawn
    fn clear(&mut self) -> Result<()>;
}
