//! Blendshape-driven expression classification

use serde::{Deserialize, Serialize};

use crate::config::ExpressionConfig;
use crate::detection::{Blendshapes, DetectionResult};

/// Discrete expression derived from blendshape scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionLabel {
    Happy,
    Surprised,
    Angry,
    Neutral,
    /// No face (or no blendshape output) in the current frame
    NoFace,
}

impl ExpressionLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Surprised => "Surprised",
            Self::Angry => "Angry",
            Self::Neutral => "Neutral",
            Self::NoFace => "NoFace",
        }
    }
}

impl std::fmt::Display for ExpressionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps blendshape scores to a discrete expression label.
///
/// Rules are evaluated in fixed priority order and the first match wins, so
/// a frame that is both smiling and open-mouthed reads as happy. Thresholds
/// are tuning constants carried in [`ExpressionConfig`], not invariants.
pub struct ExpressionClassifier {
    config: ExpressionConfig,
}

impl ExpressionClassifier {
    pub fn new(config: ExpressionConfig) -> Self {
        Self { config }
    }

    /// Classify one frame's blendshape scores.
    ///
    /// Comparisons are strict, so a score exactly at a threshold does not
    /// trigger its rule. Categories missing from the set score 0.
    pub fn classify(&self, shapes: &Blendshapes) -> ExpressionLabel {
        if shapes.is_empty() {
            return ExpressionLabel::NoFace;
        }

        let smile = shapes.score("mouthSmileLeft") + shapes.score("mouthSmileRight");
        if smile > self.config.smile_threshold {
            return ExpressionLabel::Happy;
        }

        if shapes.score("jawOpen") > self.config.jaw_open_threshold {
            return ExpressionLabel::Surprised;
        }

        let brow_down = shapes.score("browDownLeft") + shapes.score("browDownRight");
        if brow_down > self.config.brow_down_threshold {
            return ExpressionLabel::Angry;
        }

        ExpressionLabel::Neutral
    }

    /// Classify the primary face of a detection result
    pub fn classify_primary(&self, result: &DetectionResult) -> ExpressionLabel {
        match result.primary_blendshapes() {
            Some(shapes) => self.classify(shapes),
            None => ExpressionLabel::NoFace,
        }
    }
}
