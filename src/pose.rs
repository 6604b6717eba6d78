//! Scene-space poses and the conversion from normalized landmark space.
//!
//! Normalized image space has its origin at the top-left corner with y
//! pointing down and depth negative towards the camera. Scene space is
//! centered, y up, z towards the camera, and the unit image spans
//! [`SCENE_SPAN`] scene units.

use crate::constants::SCENE_SPAN;
use crate::landmarks::{Landmark, Rotation};
use nalgebra::Vector3;

/// Position, rotation and uniform scale for a model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f64>,
    /// Second anchor for paired products (right earring)
    pub secondary: Option<Vector3<f64>>,
    pub rotation: Rotation,
    pub scale: f64,
}

impl Pose {
    #[must_use]
    pub fn new(position: Vector3<f64>, rotation: Rotation, scale: f64) -> Self {
        Self {
            position,
            secondary: None,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: Vector3<f64>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// True when no component is NaN or infinite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.secondary.map_or(true, |s| s.iter().all(|v| v.is_finite()))
            && self.rotation.is_finite()
            && self.scale.is_finite()
    }
}

/// Map a normalized landmark to scene coordinates
#[must_use]
pub fn to_scene_position(landmark: &Landmark) -> Vector3<f64> {
    Vector3::new(
        (landmark.x - 0.5) * SCENE_SPAN,
        -(landmark.y - 0.5) * SCENE_SPAN,
        -landmark.z * SCENE_SPAN,
    )
}

/// Map a normalized length to scene units
#[must_use]
pub fn to_scene_length(length: f64) -> f64 {
    length * SCENE_SPAN
}
