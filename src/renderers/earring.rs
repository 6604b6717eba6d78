use super::{AnchorGeometry, AnchoredRenderer, TrackingSource};
use crate::constants::{EARRING_DROP, EARRING_SCALE, EARRING_SMOOTHING};
use crate::landmarks::FaceLandmarks;
use crate::pose::{to_scene_length, to_scene_position, Pose};
use nalgebra::Vector3;

/// An earring pair: the loaded model hangs under the left ear and a mirrored
/// clone under the right one. Both share rotation and scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarringAnchor;

impl AnchorGeometry for EarringAnchor {
    const SOURCE: TrackingSource = TrackingSource::Face;
    const NAME: &'static str = "earring";
    const SMOOTHING: f64 = EARRING_SMOOTHING;
    const MIRRORED_PAIR: bool = true;

    fn face_target(&self, face: &FaceLandmarks, scale_factor: f64) -> Option<Pose> {
        let drop = Vector3::new(0.0, EARRING_DROP * to_scene_length(face.face_width), 0.0);
        let left = to_scene_position(&face.left_ear) - drop;
        let right = to_scene_position(&face.right_ear) - drop;

        Some(
            Pose::new(left, face.rotation, scale_factor * face.face_width * EARRING_SCALE)
                .with_secondary(right),
        )
    }
}

pub type EarringRenderer = AnchoredRenderer<EarringAnchor>;
