//! Geodesic overlay: `|v| = vp·cot θ` drawn at angle `θ` off the target bearing.

use std::f64::consts::FRAC_PI_2;

use intercept_core::{Engagement, Vec2, Velocity};

const EDGE_MARGIN_RAD: f64 = 0.05;
const POINTS_PER_SIDE: usize = 180;

/// Polyline branches of the geodesic curve in velocity space.
///
/// One side of the bearing is traced per sign of `θ`; a branch is split wherever the speed
/// leaves `(0, ceiling]`, so callers can draw each returned polyline as is.
pub fn geodesic_branches(engagement: &Engagement, ceiling: f64) -> Vec<Vec<Velocity>> {
    let bearing = engagement.bearing();
    let vp = engagement.projectile_speed;
    let span = FRAC_PI_2 - 2.0 * EDGE_MARGIN_RAD;
    let mut branches = Vec::new();

    for sign in [1.0, -1.0] {
        let mut current: Vec<Velocity> = Vec::new();
        for i in 0..=POINTS_PER_SIDE {
            let theta = EDGE_MARGIN_RAD + span * i as f64 / POINTS_PER_SIDE as f64;
            let speed = vp / theta.tan();
            if speed.is_finite() && speed > 0.0 && speed <= ceiling {
                current.push(Vec2::from_polar(speed, bearing + sign * theta));
            } else if current.len() > 1 {
                branches.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
        if current.len() > 1 {
            branches.push(current);
        }
    }
    branches
}
