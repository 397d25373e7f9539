//! Gesture and expression text panel
//!
//! The panel region under the video shows one text block per labeled
//! detection and hides itself entirely when the current frame has none, so
//! stale labels never linger after the subject leaves the frame.

use crate::detection::DetectionResult;
use crate::expression::ExpressionLabel;

/// Text panel state derived from the current frame's result.
///
/// For gesture results each recognized hand contributes a block with the
/// handedness (swapped to the user's view when mirrored), the gesture name
/// and the confidence percentage. For landmark results the classified
/// expression is shown instead. Detector results carry their labels as
/// overlay nodes and leave the panel hidden.
#[derive(Debug, Default)]
pub struct LabelPanel {
    visible: bool,
    text: String,
}

impl LabelPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Panel text; meaningful only while visible
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.text.clear();
    }

    /// Rebuild the panel from one frame's result
    pub fn update(
        &mut self,
        result: &DetectionResult,
        mirrored: bool,
        expression: Option<ExpressionLabel>,
    ) {
        self.text.clear();

        match result {
            DetectionResult::Gestures(hands) => {
                for hand in hands {
                    let Some(gesture) = &hand.gesture else {
                        continue;
                    };
                    let handedness = if mirrored {
                        hand.handedness.mirrored()
                    } else {
                        hand.handedness
                    };
                    self.text.push_str(&format!(
                        "Hand: {}\nGesture: {}\nConfidence: {:.2} %\n\n",
                        handedness,
                        gesture.category_name,
                        gesture.score * 100.0,
                    ));
                }
            }
            DetectionResult::FaceLandmarks(_) => {
                if let Some(label) = expression {
                    if label != ExpressionLabel::NoFace {
                        self.text.push_str(&format!("Expression: {}", label));
                    }
                }
            }
            DetectionResult::Detections(_) => {}
        }

        self.visible = !self.text.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{
        FaceLandmarks, GestureCategory, HandDetection, Handedness, LandmarkSet,
    };

    fn hand(handedness: Handedness, gesture: Option<(&str, f32)>) -> HandDetection {
        HandDetection {
            landmarks: LandmarkSet::normalized(vec![]),
            handedness,
            gesture: gesture.map(|(name, score)| GestureCategory {
                category_name: name.to_string(),
                score,
            }),
        }
    }

    #[test]
    fn test_gesture_block_format_with_mirror_swap() {
        let mut panel = LabelPanel::new();
        let result =
            DetectionResult::Gestures(vec![hand(Handedness::Left, Some(("Thumb_Up", 0.92)))]);

        panel.update(&result, true, None);

        assert!(panel.is_visible());
        assert_eq!(
            panel.text(),
            "Hand: Right\nGesture: Thumb_Up\nConfidence: 92.00 %\n\n"
        );
    }

    #[test]
    fn test_unmirrored_keeps_engine_handedness() {
        let mut panel = LabelPanel::new();
        let result =
            DetectionResult::Gestures(vec![hand(Handedness::Left, Some(("Open_Palm", 0.5)))]);

        panel.update(&result, false, None);
        assert!(panel.text().starts_with("Hand: Left\n"));
    }

    #[test]
    fn test_one_block_per_recognized_hand() {
        let mut panel = LabelPanel::new();
        let result = DetectionResult::Gestures(vec![
            hand(Handedness::Left, Some(("Victory", 0.8))),
            hand(Handedness::Right, None),
            hand(Handedness::Right, Some(("Closed_Fist", 0.6))),
        ]);

        panel.update(&result, false, None);

        // The unrecognized hand contributes no block
        assert_eq!(panel.text().matches("Gesture:").count(), 2);
    }

    #[test]
    fn test_hidden_without_recognized_gestures() {
        let mut panel = LabelPanel::new();

        panel.update(&DetectionResult::Gestures(vec![]), false, None);
        assert!(!panel.is_visible());

        panel.update(
            &DetectionResult::Gestures(vec![hand(Handedness::Left, None)]),
            false,
            None,
        );
        assert!(!panel.is_visible());
    }

    #[test]
    fn test_expression_line_for_landmark_results() {
        let mut panel = LabelPanel::new();
        let result = DetectionResult::FaceLandmarks(vec![FaceLandmarks {
            landmarks: LandmarkSet::normalized(vec![]),
            blendshapes: None,
        }]);

        panel.update(&result, false, Some(ExpressionLabel::Happy));
        assert!(panel.is_visible());
        assert_eq!(panel.text(), "Expression: Happy");

        panel.update(&result, false, Some(ExpressionLabel::NoFace));
        assert!(!panel.is_visible());

        panel.update(&result, false, None);
        assert!(!panel.is_visible());
    }

    #[test]
    fn test_visibility_tracks_each_frame() {
        let mut panel = LabelPanel::new();
        let with_gesture =
            DetectionResult::Gestures(vec![hand(Handedness::Right, Some(("Victory", 0.7)))]);

        panel.update(&with_gesture, false, None);
        assert!(panel.is_visible());

        panel.update(&DetectionResult::Gestures(vec![]), false, None);
        assert!(!panel.is_visible());
        assert!(panel.text().is_empty());
    }

    #[test]
    fn test_hide_clears_state() {
        let mut panel = LabelPanel::new();
        let result =
            DetectionResult::Gestures(vec![hand(Handedness::Right, Some(("Victory", 0.7)))]);
        panel.update(&result, false, None);

        panel.hide();
        assert!(!panel.is_visible());
        assert!(panel.text().is_empty());
    }
}
