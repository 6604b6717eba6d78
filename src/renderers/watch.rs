use super::{AnchorGeometry, AnchoredRenderer, TrackingSource};
use crate::constants::{LIMB_ROLL_CORRECTION, WATCH_FOREARM_OFFSET, WATCH_SCALE, WATCH_SMOOTHING};
use crate::landmarks::{HandLandmarks, Handedness, Rotation};
use crate::pose::{to_scene_position, Pose};

/// Watches and bracelets sit on the forearm just behind the wrist.
///
/// The wrist-to-index-MCP vector points along the hand; stepping back along it
/// from the wrist lands on the forearm. The model's band axis is turned a
/// quarter turn to wrap the limb.
#[derive(Debug, Clone, Copy)]
pub struct WatchAnchor {
    preferred: Handedness,
}

impl WatchAnchor {
    #[must_use]
    pub const fn for_hand(preferred: Handedness) -> Self {
        Self { preferred }
    }

    #[must_use]
    pub const fn preferred(&self) -> Handedness {
        self.preferred
    }
}

impl Default for WatchAnchor {
    fn default() -> Self {
        Self::for_hand(Handedness::Left)
    }
}

impl AnchorGeometry for WatchAnchor {
    const SOURCE: TrackingSource = TrackingSource::Hand;
    const NAME: &'static str = "watch";
    const SMOOTHING: f64 = WATCH_SMOOTHING;

    fn hand_target(&self, hands: &[HandLandmarks], scale_factor: f64) -> Option<Pose> {
        let hand = HandLandmarks::select(hands, self.preferred)?;
        let wrist = to_scene_position(&hand.wrist);
        let index_mcp = to_scene_position(&hand.index_mcp());
        let position = wrist - (index_mcp - wrist) * WATCH_FOREARM_OFFSET;

        Some(Pose::new(
            position,
            hand.rotation + Rotation::new(0.0, 0.0, LIMB_ROLL_CORRECTION),
            scale_factor * hand.hand_size * WATCH_SCALE,
        ))
    }
}

pub type WatchRenderer = AnchoredRenderer<WatchAnchor>;
