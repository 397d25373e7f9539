//! Configuration parsing and management for visionloop

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, VisionLoopError};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub engine: EngineConfig,
    pub capture: CaptureConfig,
    pub display: DisplayConfig,
    pub expression: ExpressionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            engine: EngineConfig::default(),
            capture: CaptureConfig::default(),
            display: DisplayConfig::default(),
            expression: ExpressionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VisionLoopError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> Result<Self, VisionLoopError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self, VisionLoopError> {
        // Try config paths in order
        let paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("config/default.toml"),
            dirs_path().join("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), VisionLoopError> {
        // Validate capture settings
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "capture.width/height".to_string(),
                message: "Capture dimensions must be greater than 0".to_string(),
            }
            .into());
        }

        if self.capture.fps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "capture.fps".to_string(),
                message: "Capture FPS must be greater than 0".to_string(),
            }
            .into());
        }

        // Validate display settings
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.width/height".to_string(),
                message: "Display dimensions must be greater than 0".to_string(),
            }
            .into());
        }

        if self.display.refresh_hz == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.refresh_hz".to_string(),
                message: "Refresh rate must be greater than 0".to_string(),
            }
            .into());
        }

        // Validate engine settings
        if self.engine.num_faces == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.num_faces".to_string(),
                message: "At least one face must be tracked".to_string(),
            }
            .into());
        }

        if self.engine.num_hands == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.num_hands".to_string(),
                message: "At least one hand must be tracked".to_string(),
            }
            .into());
        }

        if !(0.0..=1.0).contains(&self.engine.min_confidence) {
            return Err(ConfigError::InvalidValue {
                field: "engine.min_confidence".to_string(),
                message: "Confidence must be between 0.0 and 1.0".to_string(),
            }
            .into());
        }

        // Validate expression thresholds
        for (field, value) in [
            ("expression.smile_threshold", self.expression.smile_threshold),
            (
                "expression.jaw_open_threshold",
                self.expression.jaw_open_threshold,
            ),
            (
                "expression.brow_down_threshold",
                self.expression.brow_down_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Threshold must be between 0.0 and 1.0".to_string(),
                }
                .into());
            }
        }

        // The DOM strategy places box and label nodes; it has no way to draw
        // landmark meshes, so it only pairs with the detector variant.
        if self.pipeline.strategy == RenderStrategy::Dom
            && self.pipeline.variant != PipelineVariant::FaceDetector
        {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.strategy".to_string(),
                message: "DOM strategy is only available for the face_detector variant"
                    .to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Pipeline variant and rendering strategy selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Vision task: "face_detector", "face_landmarker", or "gesture_recognizer"
    pub variant: PipelineVariant,
    /// Overlay rendering strategy: "canvas" or "dom"
    pub strategy: RenderStrategy,
    /// Derive a named expression from blendshape scores each frame
    pub classify_expression: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            variant: PipelineVariant::FaceLandmarker,
            strategy: RenderStrategy::Canvas,
            classify_expression: true,
        }
    }
}

/// Vision task selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineVariant {
    /// Face bounding boxes with keypoints and confidence
    FaceDetector,
    /// Dense face mesh with optional blendshapes
    FaceLandmarker,
    /// Hand landmarks with gesture and handedness labels
    GestureRecognizer,
}

impl PipelineVariant {
    /// File name of the model asset this variant loads
    pub fn model_asset_name(self) -> &'static str {
        match self {
            Self::FaceDetector => "blaze_face_short_range.tflite",
            Self::FaceLandmarker => "face_landmarker.task",
            Self::GestureRecognizer => "gesture_recognizer.task",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FaceDetector => "face_detector",
            Self::FaceLandmarker => "face_landmarker",
            Self::GestureRecognizer => "gesture_recognizer",
        }
    }
}

impl Default for PipelineVariant {
    fn default() -> Self {
        Self::FaceLandmarker
    }
}

impl std::str::FromStr for PipelineVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "face_detector" => Ok(Self::FaceDetector),
            "face_landmarker" => Ok(Self::FaceLandmarker),
            "gesture_recognizer" => Ok(Self::GestureRecognizer),
            other => Err(format!(
                "unknown variant '{}' (expected face_detector, face_landmarker, or gesture_recognizer)",
                other
            )),
        }
    }
}

/// Overlay rendering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStrategy {
    /// Clear-and-redraw onto a drawing surface
    Canvas,
    /// Positioned nodes in an element tree
    Dom,
}

impl Default for RenderStrategy {
    fn default() -> Self {
        Self::Canvas
    }
}

impl std::str::FromStr for RenderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canvas" => Ok(Self::Canvas),
            "dom" => Ok(Self::Dom),
            other => Err(format!(
                "unknown strategy '{}' (expected canvas or dom)",
                other
            )),
        }
    }
}

/// Compute delegate preference for the inference backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegateChoice {
    /// Prefer GPU, fall back to CPU when unavailable
    Auto,
    /// Request GPU explicitly; CPU fallback still applies
    Gpu,
    /// CPU only; GPU is never attempted
    Cpu,
}

impl Default for DelegateChoice {
    fn default() -> Self {
        Self::Auto
    }
}

impl std::str::FromStr for DelegateChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "gpu" => Ok(Self::Gpu),
            "cpu" => Ok(Self::Cpu),
            other => Err(format!(
                "unknown delegate '{}' (expected auto, gpu, or cpu)",
                other
            )),
        }
    }
}

/// Inference engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory containing model asset files
    pub model_dir: String,
    /// Compute delegate preference
    pub delegate: DelegateChoice,
    /// Maximum number of faces to track
    pub num_faces: u32,
    /// Maximum number of hands to track
    pub num_hands: u32,
    /// Emit blendshape scores alongside face landmarks
    pub output_blendshapes: bool,
    /// Minimum detection confidence (0.0 - 1.0)
    pub min_confidence: f32,
}

impl EngineConfig {
    /// Full path of the model asset for a pipeline variant
    pub fn model_asset(&self, variant: PipelineVariant) -> PathBuf {
        PathBuf::from(&self.model_dir).join(variant.model_asset_name())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: "models".to_string(),
            delegate: DelegateChoice::Auto,
            num_faces: 1,
            num_hands: 2,
            output_blendshapes: true,
            min_confidence: 0.5,
        }
    }
}

/// Camera capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device name or "default"
    pub device: String,
    /// Capture width in pixels
    pub width: u32,
    /// Capture height in pixels
    pub height: u32,
    /// Capture frame rate
    pub fps: u32,
    /// Present the feed mirrored (selfie view)
    pub mirrored: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            width: 640,
            height: 480,
            fps: 30,
            mirrored: true,
        }
    }
}

/// Display surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Displayed width in pixels
    pub width: u32,
    /// Displayed height in pixels
    pub height: u32,
    /// Render tick rate in Hz
    pub refresh_hz: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 360,
            refresh_hz: 60,
        }
    }
}

/// Expression classification thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    /// Combined left+right smile score that reads as happy (0.0 - 1.0)
    #[serde(default = "default_smile_threshold")]
    pub smile_threshold: f32,
    /// Jaw-open score that reads as surprised (0.0 - 1.0)
    #[serde(default = "default_jaw_open_threshold")]
    pub jaw_open_threshold: f32,
    /// Combined left+right brow-down score that reads as angry (0.0 - 1.0)
    #[serde(default = "default_brow_down_threshold")]
    pub brow_down_threshold: f32,
}

fn default_smile_threshold() -> f32 {
    0.5
}

fn default_jaw_open_threshold() -> f32 {
    0.6
}

fn default_brow_down_threshold() -> f32 {
    0.5
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            smile_threshold: default_smile_threshold(),
            jaw_open_threshold: default_jaw_open_threshold(),
            brow_down_threshold: default_brow_down_threshold(),
        }
    }
}

/// Get the platform-specific configuration directory
fn dirs_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("visionloop");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/visionloop");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/visionloop");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("visionloop");
        }
    }

    PathBuf::from(".")
}
