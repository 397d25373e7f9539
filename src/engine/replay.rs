//! Scripted replay engine
//!
//! Stands in for the external vision runtime in headless runs: a session
//! replays a fixed sequence of detection results, cycling when the script
//! runs out. The factory can reject the accelerated delegate to exercise
//! fallback, and the engine can inject periodic per-frame failures to
//! exercise the loop's error isolation. Scripts load from JSON files or
//! come from the builtin demo generators.

use std::f32::consts::TAU;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::PipelineVariant;
use crate::detection::{
    Blendshapes, BoundingBox, CoordinateSpace, DetectionResult, FaceDetection, FaceLandmarks,
    Frame, GestureCategory, HandDetection, Handedness, Landmark, LandmarkSet,
    FACE_LANDMARK_COUNT, HAND_LANDMARK_COUNT,
};
use crate::engine::{Delegate, EngineFactory, InferenceEngine, RunningMode, SessionOptions};
use crate::error::{ConfigError, InferenceError, ModelLoadError, VisionLoopError};

/// A sequence of detection results replayed frame by frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    pub frames: Vec<DetectionResult>,
}

impl ReplayScript {
    /// Load a script from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VisionLoopError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_str(&contents)
    }

    /// Parse a script from a JSON string
    pub fn from_str(s: &str) -> Result<Self, VisionLoopError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Builtin demo script for a pipeline variant
    pub fn for_variant(variant: PipelineVariant) -> Self {
        match variant {
            PipelineVariant::FaceDetector => Self::face_detector_demo(),
            PipelineVariant::FaceLandmarker => Self::face_landmarker_demo(),
            PipelineVariant::GestureRecognizer => Self::gesture_demo(),
        }
    }

    /// Result for the nth inference call; cycles through the script.
    ///
    /// An empty script replays empty results.
    pub fn result_for(&self, index: u64) -> DetectionResult {
        if self.frames.is_empty() {
            return DetectionResult::FaceLandmarks(vec![]);
        }
        self.frames[(index as usize) % self.frames.len()].clone()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// A slowly drifting face mesh cycling through neutral, happy,
    /// surprised and angry blendshape phases
    pub fn face_landmarker_demo() -> Self {
        let frames = (0..12)
            .map(|i| {
                let phase = i as f32 * 0.7;
                let mut shapes = Blendshapes::new();
                match i / 3 {
                    1 => {
                        shapes.insert("mouthSmileLeft", 0.35);
                        shapes.insert("mouthSmileRight", 0.35);
                    }
                    2 => {
                        shapes.insert("jawOpen", 0.8);
                    }
                    3 => {
                        shapes.insert("browDownLeft", 0.35);
                        shapes.insert("browDownRight", 0.35);
                    }
                    _ => {
                        shapes.insert("jawOpen", 0.05);
                    }
                }

                DetectionResult::FaceLandmarks(vec![FaceLandmarks {
                    landmarks: LandmarkSet::normalized(synth_face(phase)),
                    blendshapes: Some(shapes),
                }])
            })
            .collect();

        Self { frames }
    }

    /// A face box drifting side to side with six keypoints
    pub fn face_detector_demo() -> Self {
        let frames = (0..8)
            .map(|i| {
                let phase = i as f32 * 0.8;
                let origin_x = 180.0 + 60.0 * phase.sin();
                let keypoints = (0..6)
                    .map(|k| {
                        Landmark::new(
                            (origin_x + 40.0 + 30.0 * (k % 3) as f32) / 640.0,
                            (140.0 + 50.0 * (k / 3) as f32) / 480.0,
                        )
                    })
                    .collect();

                DetectionResult::Detections(vec![FaceDetection {
                    bounding_box: BoundingBox {
                        space: CoordinateSpace::Pixel,
                        origin_x,
                        origin_y: 110.0,
                        width: 180.0,
                        height: 200.0,
                    },
                    score: 0.85 + 0.1 * phase.cos().abs(),
                    keypoints: LandmarkSet::normalized(keypoints),
                }])
            })
            .collect();

        Self { frames }
    }

    /// Alternating hands cycling through a few gesture labels
    pub fn gesture_demo() -> Self {
        const GESTURES: [&str; 3] = ["Thumb_Up", "Victory", "Open_Palm"];

        let frames = (0..9)
            .map(|i| {
                let phase = i as f32 * 0.5;
                let gesture = GESTURES[i % GESTURES.len()];
                let mut hands = vec![HandDetection {
                    landmarks: LandmarkSet::normalized(synth_hand(phase, 0.35)),
                    handedness: Handedness::Right,
                    gesture: Some(GestureCategory {
                        category_name: gesture.to_string(),
                        score: 0.8 + 0.05 * (i % 3) as f32,
                    }),
                }];
                if i % 3 == 2 {
                    hands.push(HandDetection {
                        landmarks: LandmarkSet::normalized(synth_hand(phase + 1.0, 0.65)),
                        handedness: Handedness::Left,
                        gesture: Some(GestureCategory {
                            category_name: "Closed_Fist".to_string(),
                            score: 0.7,
                        }),
                    });
                }

                DetectionResult::Gestures(hands)
            })
            .collect();

        Self { frames }
    }
}

fn synth_face(phase: f32) -> Vec<Landmark> {
    (0..FACE_LANDMARK_COUNT)
        .map(|i| {
            let angle = i as f32 * TAU / FACE_LANDMARK_COUNT as f32;
            Landmark::new(
                0.5 + 0.18 * angle.cos() + 0.015 * (phase + angle).sin(),
                0.45 + 0.24 * angle.sin() + 0.015 * (phase * 1.3).cos(),
            )
        })
        .collect()
}

fn synth_hand(phase: f32, center_x: f32) -> Vec<Landmark> {
    (0..HAND_LANDMARK_COUNT)
        .map(|i| {
            let spread = i as f32 * TAU / HAND_LANDMARK_COUNT as f32;
            Landmark::new(
                center_x + 0.1 * (spread + phase).cos(),
                0.6 + 0.13 * (spread + phase).sin(),
            )
        })
        .collect()
}

/// Scripted engine session.
///
/// Enforces running-mode semantics the way the real runtime does: video
/// frames are refused until the session has been switched to video mode.
#[derive(Debug)]
pub struct ReplayEngine {
    script: ReplayScript,
    mode: RunningMode,
    fail_every: Option<u32>,
    frames_inferred: u64,
}

impl ReplayEngine {
    pub fn new(script: ReplayScript, mode: RunningMode, fail_every: Option<u32>) -> Self {
        Self {
            script,
            mode,
            fail_every,
            frames_inferred: 0,
        }
    }

    pub fn frames_inferred(&self) -> u64 {
        self.frames_inferred
    }
}

impl InferenceEngine for ReplayEngine {
    async fn set_running_mode(&mut self, mode: RunningMode) -> Result<(), InferenceError> {
        self.mode = mode;
        Ok(())
    }

    async fn infer(&mut self, _frame: Frame) -> Result<DetectionResult, InferenceError> {
        if self.mode != RunningMode::Video {
            return Err(InferenceError::Backend(
                "video frame while session is in image mode".to_string(),
            ));
        }

        let index = self.frames_inferred;
        self.frames_inferred += 1;

        if let Some(every) = self.fail_every {
            if every > 0 && self.frames_inferred % every as u64 == 0 {
                return Err(InferenceError::Backend(format!(
                    "injected failure on inference {}",
                    self.frames_inferred
                )));
            }
        }

        Ok(self.script.result_for(index))
    }
}

/// Factory for [`ReplayEngine`] sessions
#[derive(Clone)]
pub struct ReplayFactory {
    script: ReplayScript,
    reject_gpu: bool,
    fail_every: Option<u32>,
}

impl ReplayFactory {
    pub fn new(script: ReplayScript) -> Self {
        Self {
            script,
            reject_gpu: false,
            fail_every: None,
        }
    }

    /// Refuse session creation on the accelerated delegate
    pub fn with_reject_gpu(mut self, reject: bool) -> Self {
        self.reject_gpu = reject;
        self
    }

    /// Make every nth inference of created sessions fail
    pub fn with_fail_every(mut self, every: Option<u32>) -> Self {
        self.fail_every = every;
        self
    }
}

impl EngineFactory for ReplayFactory {
    type Engine = ReplayEngine;

    async fn create_session(
        &self,
        options: &SessionOptions,
    ) -> Result<ReplayEngine, ModelLoadError> {
        if self.reject_gpu && options.delegate == Delegate::Gpu {
            return Err(ModelLoadError::DelegateUnavailable {
                delegate: Delegate::Gpu,
                reason: "accelerated delegate rejected by configuration".to_string(),
            });
        }

        Ok(ReplayEngine::new(
            self.script.clone(),
            options.running_mode,
            self.fail_every,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::FrameSize;

    fn frame(timestamp_ms: u64) -> Frame {
        Frame {
            id: timestamp_ms,
            timestamp_ms,
            size: FrameSize::new(640, 480),
        }
    }

    fn two_frame_script() -> ReplayScript {
        ReplayScript {
            frames: vec![
                DetectionResult::Gestures(vec![]),
                DetectionResult::FaceLandmarks(vec![]),
            ],
        }
    }

    #[test]
    fn test_script_cycles_when_exhausted() {
        let script = two_frame_script();
        assert_eq!(script.result_for(0), script.result_for(2));
        assert_eq!(script.result_for(1), script.result_for(5));
    }

    #[test]
    fn test_empty_script_replays_empty_results() {
        let script = ReplayScript { frames: vec![] };
        assert!(script.result_for(7).is_empty());
    }

    #[test]
    fn test_script_parses_from_json() {
        let json = r#"{
            "frames": [
                {"kind": "gestures", "items": []},
                {"kind": "face_landmarks", "items": [
                    {"landmarks": {"space": "normalized", "points": []}}
                ]}
            ]
        }"#;

        let script = ReplayScript::from_str(json).unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script.result_for(1).subject_count(), 1);
    }

    #[test]
    fn test_builtin_demos_match_their_variant() {
        for (variant, expect_kind) in [
            (PipelineVariant::FaceDetector, "detections"),
            (PipelineVariant::FaceLandmarker, "face_landmarks"),
            (PipelineVariant::GestureRecognizer, "gestures"),
        ] {
            let script = ReplayScript::for_variant(variant);
            assert!(!script.is_empty());
            let matches = match script.result_for(0) {
                DetectionResult::Detections(_) => expect_kind == "detections",
                DetectionResult::FaceLandmarks(_) => expect_kind == "face_landmarks",
                DetectionResult::Gestures(_) => expect_kind == "gestures",
            };
            assert!(matches, "wrong result kind for {}", variant.as_str());
        }
    }

    #[test]
    fn test_face_demo_carries_blendshapes() {
        let script = ReplayScript::face_landmarker_demo();
        for index in 0..script.len() as u64 {
            assert!(script.result_for(index).primary_blendshapes().is_some());
        }
    }

    #[tokio::test]
    async fn test_engine_injects_periodic_failures() {
        let mut engine = ReplayEngine::new(two_frame_script(), RunningMode::Video, Some(3));

        let mut outcomes = Vec::new();
        for i in 0..6 {
            outcomes.push(engine.infer(frame(i * 33)).await.is_ok());
        }
        assert_eq!(outcomes, vec![true, true, false, true, true, false]);
    }

    #[tokio::test]
    async fn test_factory_rejects_accelerated_delegate() {
        let factory = ReplayFactory::new(two_frame_script()).with_reject_gpu(true);
        let options = SessionOptions {
            model_asset: "models/face_landmarker.task".into(),
            delegate: Delegate::Gpu,
            running_mode: RunningMode::Image,
            num_faces: 1,
            num_hands: 2,
            output_blendshapes: true,
            min_confidence: 0.5,
        };

        let err = factory.create_session(&options).await.unwrap_err();
        assert!(matches!(
            err,
            ModelLoadError::DelegateUnavailable {
                delegate: Delegate::Gpu,
                ..
            }
        ));

        let cpu = SessionOptions {
            delegate: Delegate::Cpu,
            ..options
        };
        assert!(factory.create_session(&cpu).await.is_ok());
    }
}
