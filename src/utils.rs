//! Geometry helpers over normalized landmark space.

use crate::landmarks::{BoundingBox, Landmark};
use std::f64::consts::{PI, TAU};

/// Euclidean distance in all three axes
#[must_use]
pub fn distance(a: &Landmark, b: &Landmark) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Euclidean distance in the image plane, ignoring depth
#[must_use]
pub fn distance_2d(a: &Landmark, b: &Landmark) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Component-wise midpoint
#[must_use]
pub fn midpoint(a: &Landmark, b: &Landmark) -> Landmark {
    Landmark::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0)
}

/// Min/max over x and y of all points, `None` for an empty slice
#[must_use]
pub fn bounding_box(points: &[Landmark]) -> Option<BoundingBox> {
    let first = points.first()?;
    let init = BoundingBox {
        x_min: first.x,
        y_min: first.y,
        x_max: first.x,
        y_max: first.y,
    };

    Some(points.iter().skip(1).fold(init, |bbox, p| BoundingBox {
        x_min: bbox.x_min.min(p.x),
        y_min: bbox.y_min.min(p.y),
        x_max: bbox.x_max.max(p.x),
        y_max: bbox.y_max.max(p.y),
    }))
}

/// Wrap an angle difference into (-π, π]
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// True when every coordinate is finite
#[must_use]
pub fn all_finite(points: &[Landmark]) -> bool {
    points.iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
}
