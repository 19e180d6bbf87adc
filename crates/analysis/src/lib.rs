//! Derived velocity-space analyses built on the intercept solvers.
//!
//! Every function here is a pure function of its inputs: no solver state survives between
//! calls, so identical inputs always reproduce identical curves and grids.

pub mod geodesic;
pub mod heatmap;
pub mod reachability;
pub mod region;

use intercept_core::constants::{RAY_COUNT, VELOCITY_CEILING_M_S, VELOCITY_STEP_M_S};
use serde::{Deserialize, Serialize};

pub use geodesic::geodesic_branches;
pub use heatmap::{
    HeatmapGrid, HeatmapSummary, VelocityWindow, compute_heatmap, iteration_shade, legend_ticks,
};
pub use reachability::{ReachabilityBoundary, compute_reachability_boundary, reachability_bound};
pub use region::{
    RaySample, RegionOfConvergence, Reentry, compute_region_of_convergence, first_decrease,
    iteration_profile, reentrant_transitions, scan_ray,
};

/// One point of a closed polar curve in velocity space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarSample {
    pub angle_deg: f64,
    pub max_velocity: f64,
}

/// Angular and radial sampling used by the polar analyses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaySettings {
    pub rays: usize,
    pub velocity_step: f64,
    pub velocity_ceiling: f64,
}

impl Default for RaySettings {
    fn default() -> Self {
        Self {
            rays: RAY_COUNT,
            velocity_step: VELOCITY_STEP_M_S,
            velocity_ceiling: VELOCITY_CEILING_M_S,
        }
    }
}

impl RaySettings {
    /// Ray directions in degrees, starting at 0 and spaced evenly around the circle.
    pub fn angles_deg(&self) -> impl Iterator<Item = f64> + '_ {
        let step = 360.0 / self.rays.max(1) as f64;
        (0..self.rays).map(move |i| i as f64 * step)
    }

    /// Speeds `0, step, 2·step, …` up to and including the ceiling.
    pub fn speeds(&self) -> impl Iterator<Item = f64> + '_ {
        let count = if self.velocity_step > 0.0 {
            (self.velocity_ceiling / self.velocity_step + 1e-9).floor() as usize
        } else {
            0
        };
        (0..=count).map(move |k| k as f64 * self.velocity_step)
    }
}
