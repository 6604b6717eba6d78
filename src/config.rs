//! Configuration management for the try-on session

use crate::camera::{CameraConstraints, FacingMode};
use crate::constants::{
    DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH, DEFAULT_FIRST_FRAME_TIMEOUT_MS, DEFAULT_LATENCY_BUDGET_MS,
    DEFAULT_LATENCY_WINDOW, MAX_HANDS,
};
use crate::detector::TrackerQuality;
use crate::filters::create_filter;
use crate::renderers::RendererConfig;
use crate::session::ProductCategory;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera acquisition
    pub camera: CameraConfig,

    /// Face mesh detector parameters
    pub face_tracking: FaceTrackingConfig,

    /// Hand detector parameters
    pub hand_tracking: HandTrackingConfig,

    /// Per-product smoothing overrides
    pub smoothing: SmoothingConfig,

    /// Latency-driven hand tracker quality
    pub adaptive_quality: AdaptiveQualityConfig,

    /// Default renderer settings
    pub renderer: RendererConfig,
}

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Ideal frame width
    pub width: u32,

    /// Ideal frame height
    pub height: u32,

    /// Front (`user`) or rear (`environment`) camera
    pub facing_mode: FacingMode,

    /// Ideal frame rate, unconstrained when absent
    pub frame_rate: Option<u32>,

    /// Bounded wait for the first frame's metadata
    pub first_frame_timeout_ms: u64,
}

/// Face tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceTrackingConfig {
    /// Request refined eye and lip landmarks
    pub refine_landmarks: bool,

    /// Minimum confidence to report a new face (0.0-1.0)
    pub min_detection_confidence: f32,

    /// Minimum confidence to keep tracking a face (0.0-1.0)
    pub min_tracking_confidence: f32,
}

/// Hand tracking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandTrackingConfig {
    /// Hands reported per frame (1-2)
    pub max_hands: usize,

    /// Quality preset applied at initialization
    pub initial_quality: TrackerQuality,
}

/// Filter spec overrides per product, e.g. `exponential:0.5` or `none`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub eyewear: Option<String>,
    pub watch: Option<String>,
    pub necklace: Option<String>,
    pub earring: Option<String>,
    pub ring: Option<String>,
}

/// Adaptive quality configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveQualityConfig {
    /// Adjust hand tracker quality from measured latency
    pub enabled: bool,

    /// Detections averaged per decision
    pub window_size: usize,

    /// Mean detection latency above which quality is lowered
    pub latency_budget_ms: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
            facing_mode: FacingMode::User,
            frame_rate: None,
            first_frame_timeout_ms: DEFAULT_FIRST_FRAME_TIMEOUT_MS,
        }
    }
}

impl CameraConfig {
    #[must_use]
    pub fn constraints(&self) -> CameraConstraints {
        CameraConstraints {
            facing_mode: self.facing_mode,
            width: self.width,
            height: self.height,
            frame_rate: self.frame_rate,
        }
    }

    #[must_use]
    pub fn first_frame_timeout(&self) -> Duration {
        Duration::from_millis(self.first_frame_timeout_ms)
    }
}

impl Default for FaceTrackingConfig {
    fn default() -> Self {
        Self {
            refine_landmarks: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl Default for HandTrackingConfig {
    fn default() -> Self {
        Self {
            max_hands: MAX_HANDS,
            initial_quality: TrackerQuality::Medium,
        }
    }
}

impl SmoothingConfig {
    /// Override for a product category; bracelets share the watch entry
    #[must_use]
    pub fn for_category(&self, category: ProductCategory) -> Option<&str> {
        match category {
            ProductCategory::Eyewear => self.eyewear.as_deref(),
            ProductCategory::Watch | ProductCategory::Bracelet => self.watch.as_deref(),
            ProductCategory::Necklace => self.necklace.as_deref(),
            ProductCategory::Earring => self.earring.as_deref(),
            ProductCategory::Ring => self.ring.as_deref(),
        }
    }

    fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("eyewear", &self.eyewear),
            ("watch", &self.watch),
            ("necklace", &self.necklace),
            ("earring", &self.earring),
            ("ring", &self.ring),
        ]
        .into_iter()
        .filter_map(|(name, spec)| spec.as_deref().map(|spec| (name, spec)))
    }
}

impl Default for AdaptiveQualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_size: DEFAULT_LATENCY_WINDOW,
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `ConfigError` if it does not parse
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text does not parse
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if serialization fails, `Io` if the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Renderer configuration for a category with its smoothing override applied
    #[must_use]
    pub fn renderer_for(&self, category: ProductCategory) -> RendererConfig {
        let mut renderer = self.renderer.clone();
        if renderer.smoothing.is_none() {
            renderer.smoothing = self.smoothing.for_category(category).map(str::to_string);
        }
        renderer
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first invalid setting
    pub fn validate(&self) -> Result<()> {
        // Validate camera
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(Error::ConfigError("Camera resolution must be non-zero".to_string()));
        }
        if self.camera.first_frame_timeout_ms == 0 {
            return Err(Error::ConfigError(
                "First frame timeout must be greater than 0".to_string(),
            ));
        }

        // Validate detector thresholds
        let face = &self.face_tracking;
        for (name, value) in [
            ("Detection confidence", face.min_detection_confidence),
            ("Tracking confidence", face.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ConfigError(format!("{name} must be between 0.0 and 1.0")));
            }
        }
        if !(1..=MAX_HANDS).contains(&self.hand_tracking.max_hands) {
            return Err(Error::ConfigError(format!(
                "Max hands must be between 1 and {MAX_HANDS}"
            )));
        }

        // Validate smoothing overrides
        for (product, spec) in self.smoothing.entries() {
            create_filter(spec, 0.5)
                .map_err(|e| Error::ConfigError(format!("Invalid {product} smoothing: {e}")))?;
        }

        // Validate adaptive quality
        if self.adaptive_quality.window_size == 0 {
            return Err(Error::ConfigError(
                "Latency window size must be greater than 0".to_string(),
            ));
        }
        let budget = self.adaptive_quality.latency_budget_ms;
        if !budget.is_finite() || budget <= 0.0 {
            return Err(Error::ConfigError("Latency budget must be positive".to_string()));
        }

        self.renderer.validate()
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Wearable Try-On Configuration

# Camera acquisition
camera:
  width: 1280
  height: 720
  facing_mode: "user"
  first_frame_timeout_ms: 10000

# Face mesh detector
face_tracking:
  refine_landmarks: true
  min_detection_confidence: 0.5
  min_tracking_confidence: 0.5

# Hand detector
hand_tracking:
  max_hands: 2
  initial_quality: "medium"

# Per-product smoothing overrides ("none", "exponential" or "exponential:<factor>")
smoothing:
  necklace: "exponential:0.2"

# Latency-driven hand tracker quality
adaptive_quality:
  enabled: true
  window_size: 30
  latency_budget_ms: 45.0

# Default renderer settings
renderer:
  model_url: "models/product.glb"
  lod_urls:
    medium: "models/product-medium.glb"
    low: "models/product-low.glb"
  scale_factor: 1.0
  default_position: [0.0, 0.0, 0.0]
  default_rotation: [0.0, 0.0, 0.0]
  enable_occlusion: true
  enable_shadows: true
"#;
