//! Newton-Raphson on `F(t) = t - D(t) / vp`, where `D(t) = |target - shooter - v·t|`.
//!
//! Starting from the straight-line flight time, each step moves `t` by `-F / F'` with
//! `F'(t) = 1 + (X·vx + Y·vy) / (vp·D)`, clamped at [`MIN_FLIGHT_TIME_S`].

use intercept_core::constants::{MIN_FLIGHT_TIME_S, NUMERICAL_FLOOR};
use intercept_core::{Engagement, Vec2, Velocity};

use crate::record::IterationRecord;

/// Run at most `max_iter` Newton steps and return the trace.
///
/// Stops early once the landing point is within tolerance, when `D` collapses below the
/// numerical floor (the step is still recorded), or when `F'` is singular. A singular stop
/// leaves a non-convergent trace.
pub fn run_newton_iterations(
    engagement: &Engagement,
    shooter_velocity: Velocity,
    max_iter: usize,
) -> Vec<IterationRecord> {
    let line_of_sight = engagement.line_of_sight();
    let vp = engagement.projectile_speed;
    let mut records = Vec::with_capacity(max_iter.min(32));

    let mut t = line_of_sight.length() / vp;
    let mut previous_t: Option<f64> = None;

    for iteration in 1..=max_iter {
        let relative = line_of_sight - shooter_velocity * t;
        let distance = relative.length();
        let flight = distance / vp;

        let offset = -shooter_velocity * t;
        let virtual_target = engagement.target + offset;
        let actual_trajectory_end = virtual_target + shooter_velocity * flight;

        records.push(IterationRecord {
            iteration,
            relative_position: relative,
            tau: flight,
            tau_prev: previous_t.unwrap_or(t),
            virtual_target,
            virtual_target_offset: offset,
            actual_trajectory_end,
        });

        if distance < NUMERICAL_FLOOR || engagement.is_hit(actual_trajectory_end) {
            break;
        }

        let Some(step) = newton_step(t, relative, distance, shooter_velocity, vp) else {
            break;
        };
        previous_t = Some(t);
        t = step;
    }

    records
}

/// First iteration index at which the Newton recurrence lands within tolerance, or `max_iter`.
///
/// Same recurrence as [`run_newton_iterations`] without building records. The landing error
/// of a step equals `|F|·|v|`, so no landing point is formed either.
pub fn newton_iterations_to_convergence(
    engagement: &Engagement,
    shooter_velocity: Velocity,
    max_iter: usize,
) -> usize {
    let line_of_sight = engagement.line_of_sight();
    let initial_distance = line_of_sight.length();
    if initial_distance < NUMERICAL_FLOOR {
        return 1;
    }

    let vp = engagement.projectile_speed;
    let speed = shooter_velocity.length();
    let mut t = initial_distance / vp;

    for k in 1..=max_iter {
        let relative = line_of_sight - shooter_velocity * t;
        let distance = relative.length();
        if distance < NUMERICAL_FLOOR {
            return k;
        }
        let residual = t - distance / vp;
        if residual.abs() * speed <= engagement.tolerance {
            return k;
        }
        match newton_step(t, relative, distance, shooter_velocity, vp) {
            Some(next) => t = next,
            None => return max_iter,
        }
    }
    max_iter
}

fn newton_step(t: f64, relative: Vec2, distance: f64, velocity: Velocity, vp: f64) -> Option<f64> {
    let residual = t - distance / vp;
    let derivative = 1.0 + relative.dot(&velocity) / (vp * distance);
    if derivative.abs() < NUMERICAL_FLOOR {
        return None;
    }
    Some((t - residual / derivative).max(MIN_FLIGHT_TIME_S))
}
