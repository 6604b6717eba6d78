//! Landmark builders shared by unit tests

use crate::constants::{
    FACE_CHIN, FACE_LEFT_EAR, FACE_LEFT_EYE, FACE_NOSE_TIP, FACE_RIGHT_EAR, FACE_RIGHT_EYE,
    HAND_INDEX_MCP, HAND_MIDDLE_MCP, HAND_MIDDLE_TIP, HAND_RING_MCP, HAND_RING_PIP, HAND_WRIST,
    NUM_FACE_LANDMARKS, NUM_HAND_LANDMARKS,
};
use crate::landmarks::{FaceLandmarks, HandLandmarks, Handedness, Landmark};

/// Level face: eyes 0.2 apart, ears 0.3 apart, box 0.3 wide and 0.5 tall
pub fn face() -> FaceLandmarks {
    face_shifted(0.0)
}

/// Same face moved horizontally by `dx`
pub fn face_shifted(dx: f64) -> FaceLandmarks {
    let mut points = vec![Landmark::new(0.5 + dx, 0.5, 0.0); NUM_FACE_LANDMARKS];
    points[FACE_LEFT_EYE] = Landmark::new(0.4 + dx, 0.4, 0.0);
    points[FACE_RIGHT_EYE] = Landmark::new(0.6 + dx, 0.4, 0.0);
    points[FACE_LEFT_EAR] = Landmark::new(0.35 + dx, 0.45, 0.0);
    points[FACE_RIGHT_EAR] = Landmark::new(0.65 + dx, 0.45, 0.0);
    points[FACE_NOSE_TIP] = Landmark::new(0.5 + dx, 0.5, -0.05);
    points[FACE_CHIN] = Landmark::new(0.5 + dx, 0.7, 0.0);
    points[10] = Landmark::new(0.5 + dx, 0.2, 0.0);
    FaceLandmarks::from_points(points).expect("fixture face is valid")
}

/// Upright hand 0.4 long with its wrist at (`x`, 0.8)
pub fn hand(handedness: Handedness, x: f64) -> HandLandmarks {
    let mut points = vec![Landmark::new(x, 0.5, 0.0); NUM_HAND_LANDMARKS];
    points[HAND_WRIST] = Landmark::new(x, 0.8, 0.0);
    points[HAND_INDEX_MCP] = Landmark::new(x - 0.05, 0.6, 0.0);
    points[HAND_MIDDLE_MCP] = Landmark::new(x, 0.6, 0.0);
    points[HAND_MIDDLE_TIP] = Landmark::new(x, 0.4, 0.0);
    points[HAND_RING_MCP] = Landmark::new(x + 0.05, 0.6, 0.0);
    points[HAND_RING_PIP] = Landmark::new(x + 0.05, 0.5, 0.0);
    HandLandmarks::from_points(handedness, points).expect("fixture hand is valid")
}
