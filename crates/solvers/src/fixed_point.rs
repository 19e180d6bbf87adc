//! Fixed-point refinement of the virtual-target aim point.
//!
//! Each step shifts the real target against the shooter's velocity by the previous flight-time
//! estimate, then re-measures the flight time to that shifted point. The loop stops once two
//! successive estimates agree to within [`SETTLE_THRESHOLD_S`], which is independent of the
//! caller's landing tolerance. The first step only seeds the estimate from the straight-line
//! flight time, so a run never settles before step 2.

use intercept_core::constants::SETTLE_THRESHOLD_S;
use intercept_core::{Engagement, Velocity, time_of_flight};

use crate::record::IterationRecord;

/// Run at most `max_iter` fixed-point steps and return the trace.
///
/// Exhausting `max_iter` is a normal outcome for shooter speeds near or above the projectile
/// speed; the classifier interprets it.
pub fn run_fixed_point_iterations(
    engagement: &Engagement,
    shooter_velocity: Velocity,
    max_iter: usize,
) -> Vec<IterationRecord> {
    let speed = engagement.projectile_speed;
    let mut records = Vec::with_capacity(max_iter.min(32));
    let mut relative = engagement.line_of_sight();
    let mut previous_tau: Option<f64> = None;

    for iteration in 1..=max_iter {
        let tau_prev = previous_tau.unwrap_or_else(|| time_of_flight(relative, speed));
        let offset = -shooter_velocity * tau_prev;
        let virtual_target = engagement.target + offset;
        let tau = time_of_flight(virtual_target - engagement.shooter, speed);
        let actual_trajectory_end = virtual_target + shooter_velocity * tau;

        records.push(IterationRecord {
            iteration,
            relative_position: relative,
            tau,
            tau_prev,
            virtual_target,
            virtual_target_offset: offset,
            actual_trajectory_end,
        });

        if let Some(prev) = previous_tau {
            if (tau - prev).abs() < SETTLE_THRESHOLD_S {
                break;
            }
        }

        relative = virtual_target - engagement.shooter;
        previous_tau = Some(tau);
    }

    records
}
