//! Region-of-convergence ray marcher and per-ray diagnostics.
//!
//! The marcher records the first failing speed along each ray. That is a linear search which
//! assumes failure is not re-entrant along a ray; [`scan_ray`] and [`reentrant_transitions`]
//! exist to check that assumption for a given geometry.

use intercept_core::{Engagement, Vec2};
use intercept_solvers::SolverMethod;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{PolarSample, RaySettings};

/// Closed polar curve bounding the velocities that converge within `budget` iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionOfConvergence {
    pub solver: SolverMethod,
    pub budget: usize,
    pub samples: Vec<PolarSample>,
}

impl RegionOfConvergence {
    /// Boundary speed of the ray closest to `angle_deg`.
    pub fn max_velocity_at(&self, angle_deg: f64) -> Option<f64> {
        let wrapped = angle_deg.rem_euclid(360.0);
        self.samples
            .iter()
            .min_by(|a, b| {
                angular_gap(a.angle_deg, wrapped).total_cmp(&angular_gap(b.angle_deg, wrapped))
            })
            .map(|s| s.max_velocity)
    }
}

fn angular_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// March every ray outward and record where convergence first fails.
///
/// A ray that converges all the way to the ceiling records the ceiling itself.
pub fn compute_region_of_convergence(
    engagement: &Engagement,
    solver: SolverMethod,
    max_iter: usize,
    settings: &RaySettings,
) -> RegionOfConvergence {
    let budget = max_iter.max(1);
    let samples: Vec<PolarSample> = settings
        .angles_deg()
        .map(|angle_deg| PolarSample {
            angle_deg,
            max_velocity: first_failing_speed(engagement, solver, angle_deg, budget, settings),
        })
        .collect();
    debug!(
        "region of convergence: solver={solver} budget={budget} rays={} open_rays={}",
        samples.len(),
        samples
            .iter()
            .filter(|s| s.max_velocity >= settings.velocity_ceiling)
            .count()
    );
    RegionOfConvergence {
        solver,
        budget,
        samples,
    }
}

fn first_failing_speed(
    engagement: &Engagement,
    solver: SolverMethod,
    angle_deg: f64,
    budget: usize,
    settings: &RaySettings,
) -> f64 {
    let angle = angle_deg.to_radians();
    settings
        .speeds()
        .find(|&speed| {
            solver.is_convergence_failure(engagement, Vec2::from_polar(speed, angle), budget)
        })
        .unwrap_or(settings.velocity_ceiling)
}

/// Classifier outcome at one speed along a ray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RaySample {
    pub speed: f64,
    pub converged: bool,
}

/// A failing stretch of a ray followed by renewed convergence further out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reentry {
    /// First speed of the failing stretch.
    pub failed_at: f64,
    /// First converging speed after it.
    pub recovered_at: f64,
}

/// Classify every speed along one ray instead of stopping at the first failure.
pub fn scan_ray(
    engagement: &Engagement,
    solver: SolverMethod,
    angle_deg: f64,
    max_iter: usize,
    settings: &RaySettings,
) -> Vec<RaySample> {
    let budget = max_iter.max(1);
    let angle = angle_deg.to_radians();
    settings
        .speeds()
        .map(|speed| RaySample {
            speed,
            converged: !solver.is_convergence_failure(
                engagement,
                Vec2::from_polar(speed, angle),
                budget,
            ),
        })
        .collect()
}

/// Failure-to-success transitions along a scanned ray. Empty when the ray is monotone.
pub fn reentrant_transitions(samples: &[RaySample]) -> Vec<Reentry> {
    let mut transitions = Vec::new();
    let mut failing_since: Option<f64> = None;
    for sample in samples {
        match (sample.converged, failing_since) {
            (false, None) => failing_since = Some(sample.speed),
            (true, Some(failed_at)) => {
                transitions.push(Reentry {
                    failed_at,
                    recovered_at: sample.speed,
                });
                failing_since = None;
            }
            _ => {}
        }
    }
    transitions
}

/// `(speed, iterations_to_converge)` along one ray.
pub fn iteration_profile(
    engagement: &Engagement,
    solver: SolverMethod,
    angle_deg: f64,
    max_iter: usize,
    settings: &RaySettings,
) -> Vec<(f64, usize)> {
    let budget = max_iter.max(1);
    let angle = angle_deg.to_radians();
    settings
        .speeds()
        .map(|speed| {
            let iterations =
                solver.iterations_to_converge(engagement, Vec2::from_polar(speed, angle), budget);
            (speed, iterations)
        })
        .collect()
}

/// Index of the first profile entry whose count drops below its predecessor's.
pub fn first_decrease(profile: &[(f64, usize)]) -> Option<usize> {
    profile
        .windows(2)
        .position(|pair| pair[1].1 < pair[0].1)
        .map(|i| i + 1)
}
