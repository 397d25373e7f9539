//! Frame-to-display coordinate mapping
//!
//! Engine geometry arrives in the frame's space (normalized or pixel); the
//! overlay draws in display space, optionally mirrored for selfie view. All
//! scaling happens here so renderers only ever see display coordinates.

use crate::detection::{BoundingBox, CoordinateSpace, FrameSize, Landmark, LandmarkSet};

/// Size of the displayed overlay region in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A point in display space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

/// An axis-aligned rectangle in display space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Transforms engine geometry into display coordinates.
///
/// The coordinate space is taken from the geometry itself, never inferred
/// from value magnitudes, so a pixel coordinate that happens to be 1.0 is
/// mapped correctly.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    display: DisplaySize,
    mirrored: bool,
}

impl CoordinateMapper {
    pub fn new(display: DisplaySize, mirrored: bool) -> Self {
        Self { display, mirrored }
    }

    pub fn display_size(&self) -> DisplaySize {
        self.display
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Map one landmark into display space.
    ///
    /// Mirroring reflects x across the display width; a point at normalized
    /// 0.0 lands exactly on the far display edge and stays there. Only
    /// negative components clamp to 0, anything in bounds passes unaltered.
    pub fn map_point(
        &self,
        point: Landmark,
        space: CoordinateSpace,
        frame: FrameSize,
    ) -> DisplayPoint {
        let mut x = self.scale_x(point.x, space, frame);
        let y = self.scale_y(point.y, space, frame);

        if self.mirrored {
            x = self.display.width as f32 - x;
        }

        DisplayPoint {
            x: clamp_negative(x),
            y: clamp_negative(y),
        }
    }

    /// Map every landmark of a set into display space
    pub fn map_landmarks(&self, set: &LandmarkSet, frame: FrameSize) -> Vec<DisplayPoint> {
        set.points
            .iter()
            .map(|p| self.map_point(*p, set.space, frame))
            .collect()
    }

    /// Map a bounding box into display space.
    ///
    /// Mirroring reflects across the box's far edge so the rectangle still
    /// covers the same subject: left' = width - (left + w).
    pub fn map_rect(&self, rect: &BoundingBox, frame: FrameSize) -> DisplayRect {
        let mut x = self.scale_x(rect.origin_x, rect.space, frame);
        let y = self.scale_y(rect.origin_y, rect.space, frame);
        let width = self.scale_x(rect.width, rect.space, frame);
        let height = self.scale_y(rect.height, rect.space, frame);

        if self.mirrored {
            x = self.display.width as f32 - (x + width);
        }

        DisplayRect {
            x: clamp_negative(x),
            y: clamp_negative(y),
            width,
            height,
        }
    }

    fn scale_x(&self, v: f32, space: CoordinateSpace, frame: FrameSize) -> f32 {
        match space {
            CoordinateSpace::Normalized => v * self.display.width as f32,
            CoordinateSpace::Pixel => v * self.display.width as f32 / frame.width as f32,
        }
    }

    fn scale_y(&self, v: f32, space: CoordinateSpace, frame: FrameSize) -> f32 {
        match space {
            CoordinateSpace::Normalized => v * self.display.height as f32,
            CoordinateSpace::Pixel => v * self.display.height as f32 / frame.height as f32,
        }
    }
}

fn clamp_negative(v: f32) -> f32 {
    if v < 0.0 {
        0.0
    } else {
        v
    }
}
