//! Landmark types and the geometry derived from them each frame.
//!
//! Derivation is total: a detection that is too short or contains non-finite
//! coordinates yields `None` rather than an error, so callers treat it the
//! same way as "nothing detected this frame".
//!
//! The rotation estimates here are few-landmark heuristics, not a perspective
//! solve. Downstream smoothing is tuned against their noise, so the formulas
//! are pinned by tests.

use crate::constants::{
    EPSILON, FACE_CHIN, FACE_LEFT_EAR, FACE_LEFT_EYE, FACE_NOSE_TIP, FACE_RIGHT_EAR, FACE_RIGHT_EYE,
    HAND_INDEX_MCP, HAND_MIDDLE_MCP, HAND_MIDDLE_TIP, HAND_RING_MCP, HAND_RING_PIP, HAND_WRIST,
    NUM_FACE_LANDMARKS, NUM_HAND_LANDMARKS, PITCH_CALIBRATION, PITCH_GAIN, YAW_GAIN,
};
use crate::utils::{all_finite, bounding_box, distance, distance_2d, midpoint, wrap_angle};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Range, Sub};

/// A single detected point in normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0 at the left image edge
    pub x: f64,
    /// Vertical position, 0 at the top image edge
    pub y: f64,
    /// Relative depth, negative towards the camera
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Euler rotation estimate in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotation {
    #[must_use]
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Scale each axis independently
    #[must_use]
    pub fn damped(self, pitch: f64, yaw: f64, roll: f64) -> Self {
        Self::new(self.pitch * pitch, self.yaw * yaw, self.roll * roll)
    }

    /// Move `factor` of the way towards `target` along the shorter arc of each axis
    #[must_use]
    pub fn towards(self, target: Self, factor: f64) -> Self {
        let step = |from: f64, to: f64| from + wrap_angle(to - from) * factor;
        Self::new(
            step(self.pitch, target.pitch),
            step(self.yaw, target.yaw),
            step(self.roll, target.roll),
        )
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

impl Add for Rotation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.pitch + rhs.pitch, self.yaw + rhs.yaw, self.roll + rhs.roll)
    }
}

impl Sub for Rotation {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.pitch - rhs.pitch, self.yaw - rhs.yaw, self.roll - rhs.roll)
    }
}

impl Mul<f64> for Rotation {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.pitch * rhs, self.yaw * rhs, self.roll * rhs)
    }
}

/// Axis-aligned box in normalized image space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        ((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }
}

/// Face geometry derived from one face mesh detection
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    /// Raw mesh points in detector order
    pub points: Vec<Landmark>,
    pub bounding_box: BoundingBox,
    pub rotation: Rotation,
    /// Eye on the image-left side
    pub left_eye: Landmark,
    /// Eye on the image-right side
    pub right_eye: Landmark,
    pub inter_eye_distance: f64,
    pub left_ear: Landmark,
    pub right_ear: Landmark,
    pub inter_ear_distance: f64,
    pub nose: Landmark,
    pub chin: Landmark,
    pub face_width: f64,
    pub face_height: f64,
}

impl FaceLandmarks {
    /// Derive face geometry from a raw mesh, `None` when the mesh is unusable
    #[must_use]
    pub fn from_points(points: Vec<Landmark>) -> Option<Self> {
        if points.len() < NUM_FACE_LANDMARKS {
            log::debug!(
                "Discarding face mesh with {} points (expected {})",
                points.len(),
                NUM_FACE_LANDMARKS
            );
            return None;
        }
        if !all_finite(&points) {
            log::debug!("Discarding face mesh with non-finite coordinates");
            return None;
        }

        let bounding_box = bounding_box(&points)?;
        let left_eye = points[FACE_LEFT_EYE];
        let right_eye = points[FACE_RIGHT_EYE];
        let left_ear = points[FACE_LEFT_EAR];
        let right_ear = points[FACE_RIGHT_EAR];
        let nose = points[FACE_NOSE_TIP];
        let chin = points[FACE_CHIN];
        let face_height = bounding_box.height();

        let rotation = estimate_face_rotation(&left_eye, &right_eye, &nose, &chin, face_height);

        Some(Self {
            bounding_box,
            rotation,
            left_eye,
            right_eye,
            inter_eye_distance: distance(&left_eye, &right_eye),
            left_ear,
            right_ear,
            inter_ear_distance: distance(&left_ear, &right_ear),
            nose,
            chin,
            face_width: bounding_box.width(),
            face_height,
            points,
        })
    }

    /// Midpoint of the two eye landmarks
    #[must_use]
    pub fn eye_center(&self) -> Landmark {
        midpoint(&self.left_eye, &self.right_eye)
    }
}

/// Heuristic head rotation from eyes, nose and chin.
///
/// - roll: angle of the eye line, `atan2(Δy, Δx)`
/// - pitch: nose-to-chin share of face height around [`PITCH_CALIBRATION`]
/// - yaw: horizontal nose offset from the eye midpoint over the eye distance
#[must_use]
pub fn estimate_face_rotation(
    left_eye: &Landmark,
    right_eye: &Landmark,
    nose: &Landmark,
    chin: &Landmark,
    face_height: f64,
) -> Rotation {
    let roll = (right_eye.y - left_eye.y).atan2(right_eye.x - left_eye.x);

    let pitch = if face_height > EPSILON {
        ((chin.y - nose.y) / face_height - PITCH_CALIBRATION) * PITCH_GAIN
    } else {
        0.0
    };

    let eye_distance = distance_2d(left_eye, right_eye);
    let yaw = if eye_distance > EPSILON {
        let eye_mid_x = (left_eye.x + right_eye.x) / 2.0;
        (nose.x - eye_mid_x) / eye_distance * YAW_GAIN
    } else {
        0.0
    };

    Rotation::new(pitch, yaw, roll)
}

/// Which hand a detection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// Finger groups of the hand skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Self; 5] = [Self::Thumb, Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    /// Index range of this finger's joints, base to tip
    #[must_use]
    pub const fn range(self) -> Range<usize> {
        match self {
            Self::Thumb => 1..5,
            Self::Index => 5..9,
            Self::Middle => 9..13,
            Self::Ring => 13..17,
            Self::Pinky => 17..21,
        }
    }
}

/// Hand geometry derived from one hand detection
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub handedness: Handedness,
    pub points: Vec<Landmark>,
    pub wrist: Landmark,
    /// 3D distance wrist to middle fingertip
    pub hand_size: f64,
    pub rotation: Rotation,
    /// Where a ring sits: between ring MCP and ring PIP
    pub ring_anchor: Landmark,
}

impl HandLandmarks {
    /// Derive hand geometry, `None` when the detection is unusable
    #[must_use]
    pub fn from_points(handedness: Handedness, points: Vec<Landmark>) -> Option<Self> {
        if points.len() < NUM_HAND_LANDMARKS {
            log::debug!(
                "Discarding {:?} hand with {} points (expected {})",
                handedness,
                points.len(),
                NUM_HAND_LANDMARKS
            );
            return None;
        }
        if !all_finite(&points) {
            log::debug!("Discarding {handedness:?} hand with non-finite coordinates");
            return None;
        }

        let wrist = points[HAND_WRIST];
        let hand_size = distance(&wrist, &points[HAND_MIDDLE_TIP]);
        let rotation = estimate_hand_rotation(
            &wrist,
            &points[HAND_INDEX_MCP],
            &points[HAND_MIDDLE_MCP],
            hand_size,
        );
        let ring_anchor = midpoint(&points[HAND_RING_MCP], &points[HAND_RING_PIP]);

        Some(Self {
            handedness,
            wrist,
            hand_size,
            rotation,
            ring_anchor,
            points,
        })
    }

    /// Joints of one finger, base to tip
    #[must_use]
    pub fn finger(&self, finger: Finger) -> &[Landmark] {
        &self.points[finger.range()]
    }

    #[must_use]
    pub fn index_mcp(&self) -> Landmark {
        self.points[HAND_INDEX_MCP]
    }

    /// Pick the hand with the preferred handedness, falling back to the first
    #[must_use]
    pub fn select(hands: &[Self], preferred: Handedness) -> Option<&Self> {
        hands
            .iter()
            .find(|hand| hand.handedness == preferred)
            .or_else(|| hands.first())
    }
}

/// Heuristic hand rotation.
///
/// - roll: angle of the wrist to middle-MCP vector in the image plane
/// - pitch: depth change along that vector against its planar length
/// - yaw: horizontal index-MCP offset from middle-MCP over hand size
#[must_use]
pub fn estimate_hand_rotation(
    wrist: &Landmark,
    index_mcp: &Landmark,
    middle_mcp: &Landmark,
    hand_size: f64,
) -> Rotation {
    let dx = middle_mcp.x - wrist.x;
    let dy = middle_mcp.y - wrist.y;
    let dz = middle_mcp.z - wrist.z;

    let roll = dy.atan2(dx);
    let pitch = dz.atan2(dx.hypot(dy));
    let yaw = if hand_size > EPSILON {
        (index_mcp.x - middle_mcp.x) / hand_size * YAW_GAIN
    } else {
        0.0
    };

    Rotation::new(pitch, yaw, roll)
}
