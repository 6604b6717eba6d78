use super::{AnchorGeometry, AnchoredRenderer, TrackingSource};
use crate::constants::{LIMB_ROLL_CORRECTION, RING_SCALE, RING_SMOOTHING};
use crate::landmarks::{HandLandmarks, Handedness, Rotation};
use crate::pose::{to_scene_position, Pose};

/// Rings sit between the ring finger's MCP and PIP joints
#[derive(Debug, Clone, Copy)]
pub struct RingAnchor {
    preferred: Handedness,
}

impl RingAnchor {
    #[must_use]
    pub const fn for_hand(preferred: Handedness) -> Self {
        Self { preferred }
    }
}

impl Default for RingAnchor {
    fn default() -> Self {
        Self::for_hand(Handedness::Left)
    }
}

impl AnchorGeometry for RingAnchor {
    const SOURCE: TrackingSource = TrackingSource::Hand;
    const NAME: &'static str = "ring";
    const SMOOTHING: f64 = RING_SMOOTHING;

    fn hand_target(&self, hands: &[HandLandmarks], scale_factor: f64) -> Option<Pose> {
        let hand = HandLandmarks::select(hands, self.preferred)?;
        Some(Pose::new(
            to_scene_position(&hand.ring_anchor),
            hand.rotation + Rotation::new(0.0, 0.0, LIMB_ROLL_CORRECTION),
            scale_factor * hand.hand_size * RING_SCALE,
        ))
    }
}

pub type RingRenderer = AnchoredRenderer<RingAnchor>;
