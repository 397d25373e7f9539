//! Canvas rendering strategy
//!
//! Clear-and-redraw over a drawing surface: every render wipes the whole
//! surface and repaints the current result from scratch, so the strategy is
//! stateless across frames. [`SoftwareCanvas`] backs the surface with an
//! RGBA image and can dump numbered PNG frames for inspection.

use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::detection::{DetectionResult, FrameSize};
use crate::error::{RenderError, Result};
use crate::overlay::geometry::{CoordinateMapper, DisplayPoint, DisplayRect, DisplaySize};
use crate::overlay::topology::{
    self, Style, BOX_STYLE, FACE_CONNECTOR_SETS, HAND_CONNECTOR_STYLE, HAND_POINT_STYLE,
    KEYPOINT_STYLE,
};
use crate::overlay::OverlayRenderer;

/// Drawing primitives the canvas strategy needs from its backing surface
pub trait Surface {
    fn size(&self) -> DisplaySize;
    fn clear(&mut self);
    fn draw_line(&mut self, from: DisplayPoint, to: DisplayPoint, style: Style);
    fn draw_point(&mut self, at: DisplayPoint, style: Style);
    fn draw_rect(&mut self, rect: DisplayRect, style: Style);
    /// Flush the finished frame to wherever the surface shows it
    fn present(&mut self) -> std::result::Result<(), RenderError>;
}

/// Clear-and-redraw renderer over any [`Surface`].
///
/// Handles all three pipeline variants: landmark meshes and hand skeletons
/// as connector lines, detector output as hollow boxes with keypoint dots.
/// Connector edges whose endpoints fall outside the landmark set are
/// skipped rather than treated as errors.
pub struct CanvasRenderer<S> {
    surface: S,
    mapper: CoordinateMapper,
}

impl<S: Surface> CanvasRenderer<S> {
    pub fn new(surface: S, mapper: CoordinateMapper) -> Self {
        Self { surface, mapper }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn draw_connectors(&mut self, points: &[DisplayPoint], edges: &[(usize, usize)], style: Style) {
        for &(a, b) in edges {
            if let (Some(&from), Some(&to)) = (points.get(a), points.get(b)) {
                self.surface.draw_line(from, to, style);
            }
        }
    }
}

impl<S: Surface> OverlayRenderer for CanvasRenderer<S> {
    fn render(&mut self, result: &DetectionResult, frame: FrameSize) -> Result<()> {
        self.surface.clear();

        match result {
            DetectionResult::FaceLandmarks(faces) => {
                for face in faces {
                    let points = self.mapper.map_landmarks(&face.landmarks, frame);
                    for set in FACE_CONNECTOR_SETS {
                        self.draw_connectors(&points, set.edges, set.style);
                    }
                }
            }
            DetectionResult::Gestures(hands) => {
                for hand in hands {
                    let points = self.mapper.map_landmarks(&hand.landmarks, frame);
                    self.draw_connectors(&points, topology::HAND_CONNECTIONS, HAND_CONNECTOR_STYLE);
                    for &point in &points {
                        self.surface.draw_point(point, HAND_POINT_STYLE);
                    }
                }
            }
            DetectionResult::Detections(detections) => {
                for detection in detections {
                    let rect = self.mapper.map_rect(&detection.bounding_box, frame);
                    self.surface.draw_rect(rect, BOX_STYLE);
                    for point in self.mapper.map_landmarks(&detection.keypoints, frame) {
                        self.surface.draw_point(point, KEYPOINT_STYLE);
                    }
                }
            }
        }

        self.surface.present()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.surface.clear();
        self.surface.present()?;
        Ok(())
    }
}

/// RGBA image surface for headless rendering
pub struct SoftwareCanvas {
    image: RgbaImage,
    size: DisplaySize,
    dump_dir: Option<PathBuf>,
    frames_presented: u64,
}

impl SoftwareCanvas {
    pub fn new(size: DisplaySize) -> Self {
        Self {
            image: RgbaImage::new(size.width, size.height),
            size,
            dump_dir: None,
            frames_presented: 0,
        }
    }

    /// Save each presented frame as a numbered PNG under `dir`
    pub fn with_dump_dir(mut self, dir: PathBuf) -> Self {
        self.dump_dir = Some(dir);
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl Surface for SoftwareCanvas {
    fn size(&self) -> DisplaySize {
        self.size
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_line(&mut self, from: DisplayPoint, to: DisplayPoint, style: Style) {
        let width = style.width.round().max(1.0) as i32;
        let shallow = (to.x - from.x).abs() >= (to.y - from.y).abs();

        // Stroke width is approximated by stacking unit lines along the
        // minor axis, centered on the ideal segment.
        for i in 0..width {
            let offset = (i - (width - 1) / 2) as f32;
            let (dx, dy) = if shallow { (0.0, offset) } else { (offset, 0.0) };
            draw_line_segment_mut(
                &mut self.image,
                (from.x + dx, from.y + dy),
                (to.x + dx, to.y + dy),
                rgba(style),
            );
        }
    }

    fn draw_point(&mut self, at: DisplayPoint, style: Style) {
        let radius = style.width.round().max(1.0) as i32;
        draw_filled_circle_mut(&mut self.image, (at.x as i32, at.y as i32), radius, rgba(style));
    }

    fn draw_rect(&mut self, rect: DisplayRect, style: Style) {
        if rect.width < 1.0 || rect.height < 1.0 {
            return;
        }
        let bounds =
            Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width as u32, rect.height as u32);
        draw_hollow_rect_mut(&mut self.image, bounds, rgba(style));
    }

    fn present(&mut self) -> std::result::Result<(), RenderError> {
        self.frames_presented += 1;
        if let Some(dir) = &self.dump_dir {
            let path = dir.join(format!("frame_{:05}.png", self.frames_presented));
            self.image
                .save(&path)
                .map_err(|e| RenderError::Surface(format!("{}: {}", path.display(), e)))?;
        }
        Ok(())
    }
}

fn rgba(style: Style) -> Rgba<u8> {
    Rgba([style.color.r, style.color.g, style.color.b, style.color.a])
}

#[cfg(test)]
pub(crate) use recording::{DrawOp, RecordingSurface};


#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{
        BoundingBox, CoordinateSpace, FaceDetection, HandDetection, Handedness, Landmark,
        LandmarkSet,
    };

    const FRAME: FrameSize = FrameSize {
        width: 640,
        height: 480,
    };

    fn display() -> DisplaySize {
        DisplaySize::new(480, 360)
    }

    fn recording_renderer() -> CanvasRenderer<RecordingSurface> {
        CanvasRenderer::new(
            RecordingSurface::new(display()),
            CoordinateMapper::new(display(), false),
        )
    }

    fn hand(points: usize) -> HandDetection {
        let landmarks = (0..points)
            .map(|i| Landmark::new(i as f32 / 21.0, 0.5))
            .collect();
        HandDetection {
            landmarks: LandmarkSet::normalized(landmarks),
            handedness: Handedness::Right,
            gesture: None,
        }
    }

    #[test]
    fn test_render_clears_then_draws_then_presents() {
        let mut renderer = recording_renderer();
        let result = DetectionResult::Gestures(vec![hand(21)]);
        renderer.render(&result, FRAME).unwrap();

        let surface = renderer.surface();
        assert_eq!(surface.ops[0], DrawOp::Clear);
        assert_eq!(*surface.ops.last().unwrap(), DrawOp::Present);
        // 21 skeleton edges and 21 landmark dots
        assert_eq!(surface.count(|op| matches!(op, DrawOp::Line(..))), 21);
        assert_eq!(surface.count(|op| matches!(op, DrawOp::Point(..))), 21);
    }

    #[test]
    fn test_empty_result_still_clears() {
        let mut renderer = recording_renderer();
        renderer
            .render(&DetectionResult::Gestures(vec![]), FRAME)
            .unwrap();

        assert_eq!(renderer.surface().ops, vec![DrawOp::Clear, DrawOp::Present]);
    }

    #[test]
    fn test_every_render_starts_with_clear() {
        let mut renderer = recording_renderer();
        for _ in 0..3 {
            renderer
                .render(&DetectionResult::Gestures(vec![hand(21)]), FRAME)
                .unwrap();
        }

        assert_eq!(renderer.surface().count(|op| matches!(op, DrawOp::Clear)), 3);
    }

    #[test]
    fn test_out_of_range_connector_endpoints_are_skipped() {
        let mut renderer = recording_renderer();
        // A truncated hand: edges touching indices >= 5 must be dropped
        let result = DetectionResult::Gestures(vec![hand(5)]);
        renderer.render(&result, FRAME).unwrap();

        let lines = renderer.surface().count(|op| matches!(op, DrawOp::Line(..)));
        // Only (0,1), (1,2), (2,3), (3,4) fit in 5 points
        assert_eq!(lines, 4);
        assert_eq!(
            renderer.surface().count(|op| matches!(op, DrawOp::Point(..))),
            5
        );
    }

    #[test]
    fn test_detection_renders_box_and_keypoints() {
        let mut renderer = recording_renderer();
        let detection = FaceDetection {
            bounding_box: BoundingBox {
                space: CoordinateSpace::Pixel,
                origin_x: 100.0,
                origin_y: 80.0,
                width: 200.0,
                height: 160.0,
            },
            score: 0.9,
            keypoints: LandmarkSet::normalized(vec![
                Landmark::new(0.3, 0.3),
                Landmark::new(0.7, 0.3),
            ]),
        };

        renderer
            .render(&DetectionResult::Detections(vec![detection]), FRAME)
            .unwrap();

        assert_eq!(
            renderer.surface().count(|op| matches!(op, DrawOp::Rect(..))),
            1
        );
        assert_eq!(
            renderer.surface().count(|op| matches!(op, DrawOp::Point(..))),
            2
        );
    }

    #[test]
    fn test_software_canvas_draw_and_clear() {
        let mut canvas = SoftwareCanvas::new(DisplaySize::new(64, 64));
        canvas.draw_line(
            DisplayPoint { x: 0.0, y: 10.0 },
            DisplayPoint { x: 20.0, y: 10.0 },
            HAND_CONNECTOR_STYLE,
        );

        let drawn = canvas.image().get_pixel(10, 10);
        assert_eq!(drawn.0, [0x00, 0xFF, 0x00, 0xFF]);

        canvas.clear();
        assert_eq!(canvas.image().get_pixel(10, 10).0, [0, 0, 0, 0]);
    }
}
