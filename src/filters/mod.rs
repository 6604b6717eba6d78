//! Temporal filters for suppressing pose jitter.
//!
//! Renderers blend each raw anchor target into their smoothed state through a
//! [`PoseFilter`]. The first target after construction or reset passes through
//! unchanged so the model never flies in from the origin.

/// Exponential filter for responsive smoothing
pub mod exponential;

use crate::pose::Pose;
use crate::Result;

/// Trait for all pose filters
pub trait PoseFilter: Send + Sync {
    /// Blend a raw target into the filter state and return the smoothed pose
    fn apply(&mut self, target: &Pose) -> Pose;

    /// Forget all state; the next target seeds the filter
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes targets through unchanged
pub struct NoFilter;

impl PoseFilter for NoFilter {
    fn apply(&mut self, target: &Pose) -> Pose {
        *target
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a pose filter from a spec such as `none`, `exponential` or `exponential:0.4`.
///
/// A bare `exponential` uses `default_factor`.
///
/// # Errors
///
/// Returns `FilterError` for unknown filter names or out-of-range parameters
pub fn create_filter(spec: &str, default_factor: f64) -> Result<Box<dyn PoseFilter>> {
    let spec = spec.trim().to_lowercase();
    let mut parts = spec.splitn(2, ':');
    let name = parts.next().unwrap_or_default();
    let param = parts.next();

    match name {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" | "ema" => {
            let factor = match param {
                Some(raw) => raw
                    .parse::<f64>()
                    .map_err(|_| crate::Error::FilterError(format!("Invalid smoothing factor: {raw}")))?,
                None => default_factor,
            };
            validate_factor(factor)?;
            Ok(Box::new(exponential::ExponentialFilter::new(factor)))
        }
        _ => Err(crate::Error::FilterError(format!("Unknown filter type: {name}"))),
    }
}

/// Check a smoothing factor lies in (0, 1]
///
/// # Errors
///
/// Returns `FilterError` when the factor is outside (0, 1] or not finite
pub fn validate_factor(factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
        Ok(())
    } else {
        Err(crate::Error::FilterError(format!("Alpha must be in (0, 1], got {factor}")))
    }
}
