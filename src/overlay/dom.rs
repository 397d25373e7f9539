//! DOM rendering strategy
//!
//! Renders detector output as positioned nodes in an element tree: a
//! highlight box per detection, a confidence label anchored to it, and a
//! dot per keypoint. The renderer owns a slot arena of the node ids it
//! created for the current frame; every render removes the previous
//! frame's nodes before creating new ones, so no node outlives its frame.

use std::collections::BTreeMap;

use crate::detection::{DetectionResult, FrameSize};
use crate::error::{RenderError, Result};
use crate::overlay::geometry::{CoordinateMapper, DisplayPoint, DisplayRect};
use crate::overlay::OverlayRenderer;

/// Identifier of a node created by a [`NodeHost`]
pub type NodeId = u64;

/// A positioned overlay element
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayNode {
    /// Highlight rectangle over one detection
    Box { rect: DisplayRect },
    /// Confidence text anchored to the top edge of a detection's box
    Label {
        x: f32,
        y: f32,
        width: f32,
        text: String,
    },
    /// Keypoint dot
    Dot { at: DisplayPoint },
}

/// Element-tree operations the DOM strategy needs from its host
pub trait NodeHost {
    /// Insert a node into the overlay region, returning its id
    fn create_node(&mut self, node: OverlayNode) -> NodeId;

    /// Remove a previously created node; unknown ids are an error
    fn remove_node(&mut self, id: NodeId) -> std::result::Result<(), RenderError>;
}

/// Node-based renderer over any [`NodeHost`].
///
/// Only the detector variant produces node artifacts; landmark meshes are
/// the canvas strategy's job and draw nothing here.
pub struct DomRenderer<H> {
    host: H,
    mapper: CoordinateMapper,
    slots: Vec<NodeId>,
}

impl<H: NodeHost> DomRenderer<H> {
    pub fn new(host: H, mapper: CoordinateMapper) -> Self {
        Self {
            host,
            mapper,
            slots: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn remove_previous(&mut self) -> std::result::Result<(), RenderError> {
        // An id leaves the slot list only once the host removal succeeded;
        // on failure the remainder stays tracked for the next pass.
        while let Some(&id) = self.slots.last() {
            self.host.remove_node(id)?;
            self.slots.pop();
        }
        Ok(())
    }
}

impl<H: NodeHost> OverlayRenderer for DomRenderer<H> {
    fn render(&mut self, result: &DetectionResult, frame: FrameSize) -> Result<()> {
        self.remove_previous()?;

        if let DetectionResult::Detections(detections) = result {
            for detection in detections {
                let rect = self.mapper.map_rect(&detection.bounding_box, frame);

                let id = self.host.create_node(OverlayNode::Box { rect });
                self.slots.push(id);

                let id = self.host.create_node(OverlayNode::Label {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    text: format!("Confidence: {:.2} %", detection.score * 100.0),
                });
                self.slots.push(id);

                for at in self.mapper.map_landmarks(&detection.keypoints, frame) {
                    let id = self.host.create_node(OverlayNode::Dot { at });
                    self.slots.push(id);
                }
            }
        }

        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.remove_previous()?;
        Ok(())
    }
}

/// In-memory element tree for headless runs and tests
#[derive(Debug, Default)]
pub struct MemoryHost {
    next_id: NodeId,
    nodes: BTreeMap<NodeId, OverlayNode>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently alive in the tree
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &OverlayNode> {
        self.nodes.values()
    }
}

impl NodeHost for MemoryHost {
    fn create_node(&mut self, node: OverlayNode) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn remove_node(&mut self, id: NodeId) -> std::result::Result<(), RenderError> {
        self.nodes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RenderError::Host(format!("unknown node id {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use crate::detection::{
        BoundingBox, CoordinateSpace, FaceDetection, Landmark, LandmarkSet,
    };
    use crate::overlay::geometry::DisplaySize;

    const FRAME: FrameSize = FrameSize {
        width: 640,
        height: 480,
    };

    /// Host whose removals fail while the shared counter is non-zero
    struct FlakyHost {
        inner: MemoryHost,
        failures: Arc<AtomicU32>,
    }

    impl NodeHost for FlakyHost {
        fn create_node(&mut self, node: OverlayNode) -> NodeId {
            self.inner.create_node(node)
        }

        fn remove_node(&mut self, id: NodeId) -> std::result::Result<(), RenderError> {
            if self.failures.load(Ordering::Relaxed) > 0 {
                self.failures.fetch_sub(1, Ordering::Relaxed);
                return Err(RenderError::Host("node tree busy".to_string()));
            }
            self.inner.remove_node(id)
        }
    }

    fn detection(score: f32, keypoints: usize) -> FaceDetection {
        let points = (0..keypoints)
            .map(|i| Landmark::new(0.1 * i as f32, 0.4))
            .collect();
        FaceDetection {
            bounding_box: BoundingBox {
                space: CoordinateSpace::Pixel,
                origin_x: 100.0,
                origin_y: 80.0,
                width: 200.0,
                height: 160.0,
            },
            score,
            keypoints: LandmarkSet::normalized(points),
        }
    }

    fn renderer(mirrored: bool) -> DomRenderer<MemoryHost> {
        DomRenderer::new(
            MemoryHost::new(),
            CoordinateMapper::new(DisplaySize::new(480, 360), mirrored),
        )
    }

    #[test]
    fn test_live_nodes_match_last_render_exactly() {
        let mut r = renderer(false);

        // Two detections with six keypoints each: 2 * (box + label + 6)
        let two = DetectionResult::Detections(vec![detection(0.9, 6), detection(0.8, 6)]);
        r.render(&two, FRAME).unwrap();
        assert_eq!(r.host().live_count(), 16);

        // One detection next frame: everything from the previous frame goes
        let one = DetectionResult::Detections(vec![detection(0.7, 6)]);
        r.render(&one, FRAME).unwrap();
        assert_eq!(r.host().live_count(), 8);
    }

    #[test]
    fn test_empty_result_removes_all_nodes() {
        let mut r = renderer(false);
        r.render(
            &DetectionResult::Detections(vec![detection(0.9, 4)]),
            FRAME,
        )
        .unwrap();
        assert!(r.host().live_count() > 0);

        r.render(&DetectionResult::Detections(vec![]), FRAME).unwrap();
        assert_eq!(r.host().live_count(), 0);
    }

    #[test]
    fn test_confidence_label_format() {
        let mut r = renderer(false);
        r.render(
            &DetectionResult::Detections(vec![detection(0.8734, 0)]),
            FRAME,
        )
        .unwrap();

        let label = r
            .host()
            .nodes()
            .find_map(|node| match node {
                OverlayNode::Label { text, .. } => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(label, "Confidence: 87.34 %");
    }

    #[test]
    fn test_mirrored_box_reflects_across_far_edge() {
        let mut r = renderer(true);
        r.render(
            &DetectionResult::Detections(vec![detection(0.9, 0)]),
            FRAME,
        )
        .unwrap();

        let rect = r
            .host()
            .nodes()
            .find_map(|node| match node {
                OverlayNode::Box { rect } => Some(*rect),
                _ => None,
            })
            .unwrap();
        // scaled left 75, width 150 on a 480-wide display
        assert_eq!(rect.x, 255.0);
        assert_eq!(rect.width, 150.0);
    }

    #[test]
    fn test_clear_empties_the_tree() {
        let mut r = renderer(false);
        r.render(
            &DetectionResult::Detections(vec![detection(0.9, 6)]),
            FRAME,
        )
        .unwrap();

        r.clear().unwrap();
        assert_eq!(r.host().live_count(), 0);
    }

    #[test]
    fn test_failed_removal_keeps_remaining_nodes_tracked() {
        let failures = Arc::new(AtomicU32::new(0));
        let host = FlakyHost {
            inner: MemoryHost::new(),
            failures: Arc::clone(&failures),
        };
        let mut r = DomRenderer::new(
            host,
            CoordinateMapper::new(DisplaySize::new(480, 360), false),
        );

        r.render(&DetectionResult::Detections(vec![detection(0.9, 2)]), FRAME)
            .unwrap();
        assert_eq!(r.host().inner.live_count(), 4);

        // One removal fails mid-pass; nothing new is created and the
        // un-removed nodes stay tracked instead of leaking in the host
        failures.store(1, Ordering::Relaxed);
        assert!(r
            .render(&DetectionResult::Detections(vec![]), FRAME)
            .is_err());
        assert_eq!(r.host().inner.live_count(), 4);

        // The next pass removes everything it still tracks
        r.render(&DetectionResult::Detections(vec![]), FRAME).unwrap();
        assert_eq!(r.host().inner.live_count(), 0);
    }

    #[test]
    fn test_remove_unknown_node_is_an_error() {
        let mut host = MemoryHost::new();
        let id = host.create_node(OverlayNode::Dot {
            at: DisplayPoint { x: 1.0, y: 1.0 },
        });
        assert!(host.remove_node(id).is_ok());
        assert!(host.remove_node(id).is_err());
    }
}
