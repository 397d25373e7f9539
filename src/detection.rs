//! Inference result schema
//!
//! Typed counterparts of the vision engine's per-frame output: face
//! detections (boxes + keypoints), face landmark meshes with optional
//! blendshapes, and hand landmarks with gesture / handedness labels.
//! Results are ephemeral: produced for one frame, rendered, dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of landmarks in the face mesh
pub const FACE_LANDMARK_COUNT: usize = 478;
/// Number of landmarks in a hand
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Native resolution of the video frame a result was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One video sample from the capture feed.
///
/// The handle is opaque; a new frame exists only when `timestamp_ms` differs
/// from the previously processed one. Timestamps are presentation times in
/// milliseconds and advance monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Opaque sample id
    pub id: u64,
    /// Presentation timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Native resolution of the sample
    pub size: FrameSize,
}

/// Coordinate space a geometry carrier declares for its values.
///
/// Declared by the engine's output schema rather than inferred from
/// magnitudes, so a pixel coordinate of 1.0 is unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSpace {
    /// Values in [0, 1] relative to the frame
    Normalized,
    /// Values in pixels of the frame's native resolution
    Pixel,
}

/// A single landmark point, interpreted in its set's declared space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the frame; unused by 2D overlay rendering
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// An ordered set of landmarks sharing one coordinate space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub space: CoordinateSpace,
    pub points: Vec<Landmark>,
}

impl LandmarkSet {
    /// A normalized-space set, the engine's usual output for landmarks
    pub fn normalized(points: Vec<Landmark>) -> Self {
        Self {
            space: CoordinateSpace::Normalized,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Axis-aligned bounding box in its declared space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub space: CoordinateSpace,
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: f32,
    pub height: f32,
}

/// One detected face from the detector variant.
///
/// Detector boxes arrive in pixel space while the keypoints arrive
/// normalized; each carrier declares its own space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub bounding_box: BoundingBox,
    /// Detection confidence in [0, 1]
    pub score: f32,
    pub keypoints: LandmarkSet,
}

/// Blendshape name → activation score map.
///
/// Categories absent from the map read as 0.0, matching the classifier's
/// missing-score rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blendshapes(HashMap<String, f32>);

impl Blendshapes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, score: f32) {
        self.0.insert(name.into(), score);
    }

    /// Score for a named category; 0.0 when absent
    pub fn score(&self, name: &str) -> f32 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, f32)> for Blendshapes {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One tracked face from the landmarker variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub landmarks: LandmarkSet,
    /// Present when the session was created with blendshape output enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blendshapes: Option<Blendshapes>,
}

/// Left/right classification of a detected hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// The side as seen by the user on a mirrored presentation.
    ///
    /// The engine classifies hands in camera space; a mirrored display shows
    /// the user's right hand on the right, so the label must flip.
    pub fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Top-scoring gesture category for a hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureCategory {
    pub category_name: String,
    /// Recognition confidence in [0, 1]
    pub score: f32,
}

/// One recognized hand from the recognizer variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandDetection {
    pub landmarks: LandmarkSet,
    pub handedness: Handedness,
    /// Absent when no known gesture cleared the recognizer's threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gesture: Option<GestureCategory>,
}

/// Per-frame inference output, polymorphic over the pipeline variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum DetectionResult {
    /// Detector variant: bounding boxes with confidence and keypoints
    Detections(Vec<FaceDetection>),
    /// Landmarker variant: per-face meshes with optional blendshapes
    FaceLandmarks(Vec<FaceLandmarks>),
    /// Recognizer variant: per-hand landmarks with gesture labels
    Gestures(Vec<HandDetection>),
}

impl DetectionResult {
    /// Number of detected subjects (faces or hands) in this result
    pub fn subject_count(&self) -> usize {
        match self {
            Self::Detections(items) => items.len(),
            Self::FaceLandmarks(items) => items.len(),
            Self::Gestures(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject_count() == 0
    }

    /// Blendshapes of the first tracked face, when present
    pub fn primary_blendshapes(&self) -> Option<&Blendshapes> {
        match self {
            Self::FaceLandmarks(items) => items.first().and_then(|f| f.blendshapes.as_ref()),
            _ => None,
        }
    }
}
