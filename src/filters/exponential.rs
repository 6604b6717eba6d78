use super::PoseFilter;
use crate::pose::Pose;

/// Exponential smoothing filter over a whole pose.
///
/// Each update moves the state `factor` of the way towards the target:
/// `smoothed + (target - smoothed) * factor`. Angles take the shorter arc so
/// a target crossing the ±π seam does not spin the model the long way round.
pub struct ExponentialFilter {
    factor: f64,
    state: Option<Pose>,
}

impl ExponentialFilter {
    /// Create a new exponential filter
    ///
    /// # Panics
    ///
    /// Panics if factor is not in the range (0, 1]
    #[must_use]
    pub fn new(factor: f64) -> Self {
        assert!(factor > 0.0 && factor <= 1.0, "Alpha must be in (0, 1]");
        Self { factor, state: None }
    }

    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    fn blend(&self, last: &Pose, target: &Pose) -> Pose {
        let secondary = match (last.secondary, target.secondary) {
            (Some(last), Some(target)) => Some(last + (target - last) * self.factor),
            (None, Some(target)) => Some(target),
            (_, None) => None,
        };

        Pose {
            position: last.position + (target.position - last.position) * self.factor,
            secondary,
            rotation: last.rotation.towards(target.rotation, self.factor),
            scale: self.factor.mul_add(target.scale - last.scale, last.scale),
        }
    }
}

impl PoseFilter for ExponentialFilter {
    fn apply(&mut self, target: &Pose) -> Pose {
        let filtered = match &self.state {
            Some(last) => self.blend(last, target),
            None => *target,
        };

        self.state = Some(filtered);
        filtered
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
