//! Closed-form kinematic reachability boundary.

use std::f64::consts::FRAC_PI_2;

use intercept_core::Engagement;
use intercept_core::units::wrap_pi;
use serde::{Deserialize, Serialize};

use crate::{PolarSample, RaySettings};

/// `|sin φ|` below which the bound is clamped to the ceiling.
const SIN_CLAMP: f64 = 0.01;

/// Per-direction speed limit beyond which no positive-time intercept exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachabilityBoundary {
    pub samples: Vec<PolarSample>,
}

/// Reachable shooter speed for velocity direction `direction_rad`.
///
/// Rearward directions (at least 90° off the target bearing) are bounded by the projectile
/// speed; forward directions by `vp / |sin φ|`, clamped to `ceiling`.
pub fn reachability_bound(engagement: &Engagement, direction_rad: f64, ceiling: f64) -> f64 {
    let phi = wrap_pi(direction_rad - engagement.bearing());
    let vp = engagement.projectile_speed;
    if phi.abs() >= FRAC_PI_2 {
        return vp;
    }
    let sin_phi = phi.sin().abs();
    if sin_phi < SIN_CLAMP {
        return ceiling;
    }
    (vp / sin_phi).min(ceiling)
}

/// Sample [`reachability_bound`] on every ray.
pub fn compute_reachability_boundary(
    engagement: &Engagement,
    settings: &RaySettings,
) -> ReachabilityBoundary {
    let samples = settings
        .angles_deg()
        .map(|angle_deg| PolarSample {
            angle_deg,
            max_velocity: reachability_bound(
                engagement,
                angle_deg.to_radians(),
                settings.velocity_ceiling,
            ),
        })
        .collect();
    ReachabilityBoundary { samples }
}
