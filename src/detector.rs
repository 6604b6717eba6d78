//! Landmark detector boundary and its quality presets.

use crate::camera::VideoFrame;
use crate::landmarks::{Handedness, Landmark};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Detector quality level, trading latency against accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerQuality {
    Low,
    Medium,
    High,
}

/// Fixed detector parameters for one quality level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPreset {
    pub model_complexity: u8,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl TrackerQuality {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn preset(self) -> QualityPreset {
        match self {
            Self::Low => QualityPreset {
                model_complexity: 0,
                min_detection_confidence: 0.5,
                min_tracking_confidence: 0.5,
            },
            Self::Medium => QualityPreset {
                model_complexity: 1,
                min_detection_confidence: 0.6,
                min_tracking_confidence: 0.5,
            },
            Self::High => QualityPreset {
                model_complexity: 1,
                min_detection_confidence: 0.7,
                min_tracking_confidence: 0.7,
            },
        }
    }

    /// One step cheaper, `None` at the bottom
    #[must_use]
    pub const fn downgrade(self) -> Option<Self> {
        match self {
            Self::High => Some(Self::Medium),
            Self::Medium => Some(Self::Low),
            Self::Low => None,
        }
    }

    /// One step more accurate, `None` at the top
    #[must_use]
    pub const fn upgrade(self) -> Option<Self> {
        match self {
            Self::Low => Some(Self::Medium),
            Self::Medium => Some(Self::High),
            Self::High => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TrackerQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackerQuality {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(crate::Error::InvalidInput(format!("Unknown quality level: {other}"))),
        }
    }
}

/// Full detector configuration pushed through [`LandmarkDetector::configure`]
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOptions {
    pub max_faces: usize,
    pub max_hands: usize,
    pub refine_landmarks: bool,
    pub model_complexity: u8,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl DetectorOptions {
    /// Face mesh options for a single face
    #[must_use]
    pub fn face(refine_landmarks: bool, min_detection_confidence: f32, min_tracking_confidence: f32) -> Self {
        Self {
            max_faces: 1,
            max_hands: 0,
            refine_landmarks,
            model_complexity: 1,
            min_detection_confidence,
            min_tracking_confidence,
        }
    }

    /// Hand options from a quality preset
    #[must_use]
    pub fn hands(quality: TrackerQuality, max_hands: usize) -> Self {
        let preset = quality.preset();
        Self {
            max_faces: 0,
            max_hands,
            refine_landmarks: false,
            model_complexity: preset.model_complexity,
            min_detection_confidence: preset.min_detection_confidence,
            min_tracking_confidence: preset.min_tracking_confidence,
        }
    }
}

/// One hand as reported by the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    pub handedness: Handedness,
    pub points: Vec<Landmark>,
}

/// Raw detector output for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOutput {
    /// Zero or one face meshes
    pub faces: Vec<Vec<Landmark>>,
    /// Zero to two hands in detector order
    pub hands: Vec<DetectedHand>,
}

/// External landmark detector
pub trait LandmarkDetector {
    /// Apply a configuration; called once at bind time and on quality changes
    ///
    /// # Errors
    ///
    /// Returns an error when the detector rejects the options
    fn configure(&mut self, options: &DetectorOptions) -> Result<()>;

    /// Run detection on one frame
    ///
    /// # Errors
    ///
    /// Returns an error when inference fails for this frame
    fn detect(&mut self, frame: &VideoFrame) -> Result<DetectorOutput>;

    /// Release detector resources
    fn close(&mut self);
}
