use super::{AnchorGeometry, AnchoredRenderer, TrackingSource};
use crate::constants::{NECKLACE_DAMPING, NECKLACE_DROP, NECKLACE_SCALE, NECKLACE_SMOOTHING};
use crate::landmarks::FaceLandmarks;
use crate::pose::{to_scene_length, to_scene_position, Pose};
use crate::utils::midpoint;

/// Necklaces hang centered between the ears, below the chin, at chin depth.
/// The neck turns less than the head so rotation is damped per axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct NecklaceAnchor;

impl AnchorGeometry for NecklaceAnchor {
    const SOURCE: TrackingSource = TrackingSource::Face;
    const NAME: &'static str = "necklace";
    const SMOOTHING: f64 = NECKLACE_SMOOTHING;

    fn face_target(&self, face: &FaceLandmarks, scale_factor: f64) -> Option<Pose> {
        let ears = to_scene_position(&midpoint(&face.left_ear, &face.right_ear));
        let mut position = to_scene_position(&face.chin);
        position.x = ears.x;
        position.y -= NECKLACE_DROP * to_scene_length(face.face_height);

        let (pitch, yaw, roll) = NECKLACE_DAMPING;
        Some(Pose::new(
            position,
            face.rotation.damped(pitch, yaw, roll),
            scale_factor * face.face_width * NECKLACE_SCALE,
        ))
    }
}

pub type NecklaceRenderer = AnchoredRenderer<NecklaceAnchor>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::face;

    #[test]
    fn test_necklace_below_chin() {
        let face = face();
        let pose = NecklaceAnchor.face_target(&face, 1.0).unwrap();

        // chin at y 0.7 is scene -0.4; drop 0.15 of the 1.0-unit face height
        assert!(pose.position.x.abs() < 1e-12);
        assert!((pose.position.y + 0.55).abs() < 1e-12);
        assert!(pose.position.z.abs() < 1e-12);
        assert!((pose.scale - 0.3 * 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_necklace_rotation_damped() {
        let face = face();
        let pose = NecklaceAnchor.face_target(&face, 1.0).unwrap();
        assert!((pose.rotation.pitch - face.rotation.pitch * 0.3).abs() < 1e-12);
        assert!((pose.rotation.yaw - face.rotation.yaw * 0.4).abs() < 1e-12);
        assert!((pose.rotation.roll - face.rotation.roll * 0.5).abs() < 1e-12);
    }
}
