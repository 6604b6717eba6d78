use super::{AnchorGeometry, AnchoredRenderer, TrackingSource};
use crate::constants::{EYEWEAR_FORWARD_NUDGE, EYEWEAR_SCALE, EYEWEAR_SMOOTHING};
use crate::landmarks::FaceLandmarks;
use crate::pose::{to_scene_length, to_scene_position, Pose};

/// Glasses sit on the eye midpoint, slightly in front of the face, and follow
/// the full head rotation. Scale tracks the ear-to-ear distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct EyewearAnchor;

impl AnchorGeometry for EyewearAnchor {
    const SOURCE: TrackingSource = TrackingSource::Face;
    const NAME: &'static str = "eyewear";
    const SMOOTHING: f64 = EYEWEAR_SMOOTHING;

    fn face_target(&self, face: &FaceLandmarks, scale_factor: f64) -> Option<Pose> {
        let mut position = to_scene_position(&face.eye_center());
        position.z += EYEWEAR_FORWARD_NUDGE * to_scene_length(face.face_width);

        Some(Pose::new(
            position,
            face.rotation,
            scale_factor * face.inter_ear_distance * EYEWEAR_SCALE,
        ))
    }
}

pub type EyewearRenderer = AnchoredRenderer<EyewearAnchor>;
