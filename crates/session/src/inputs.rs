//! Immutable analysis snapshot and conversion from scenario manifests.

use std::time::Duration;

use intercept_analysis::{
    HeatmapGrid, RaySettings, ReachabilityBoundary, RegionOfConvergence, VelocityWindow,
    compute_heatmap, compute_reachability_boundary, compute_region_of_convergence,
    geodesic_branches,
};
use intercept_config::ScenarioConfig;
use intercept_core::{Engagement, Point, Vec2, Velocity};
use intercept_solvers::{IterationRecord, SolverMethod};
use serde::Serialize;

use crate::SessionError;

/// Default budget for traces and the region curve.
pub const DEFAULT_ITERATION_BUDGET: usize = 10;
/// Default heat-map resolution (cells per side).
pub const DEFAULT_RESOLUTION: usize = 200;
/// Default heat-map settle window.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(250);

/// Everything one round of analyses reads, copied out of the editable state.
///
/// The iteration budget drives traces, classification and the region curve; the iteration
/// cap bounds the heat-map counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisInputs {
    pub name: String,
    pub engagement: Engagement,
    pub solver: SolverMethod,
    pub shooter_velocity: Velocity,
    pub iteration_budget: usize,
    pub iteration_cap: usize,
    pub window: VelocityWindow,
    pub resolution: usize,
    pub rays: RaySettings,
    #[serde(skip)]
    pub settle: Duration,
}

impl AnalysisInputs {
    /// Snapshot with default budgets and sampling for `engagement`.
    pub fn new(engagement: Engagement, solver: SolverMethod) -> Self {
        Self {
            name: String::new(),
            engagement,
            solver,
            shooter_velocity: Vec2::ZERO,
            iteration_budget: DEFAULT_ITERATION_BUDGET,
            iteration_cap: solver.default_iteration_cap(),
            window: VelocityWindow::default(),
            resolution: DEFAULT_RESOLUTION,
            rays: RaySettings::default(),
            settle: DEFAULT_SETTLE,
        }
    }

    pub fn trace(&self) -> Vec<IterationRecord> {
        self.solver
            .run(&self.engagement, self.shooter_velocity, self.iteration_budget)
    }

    pub fn is_convergence_failure(&self) -> bool {
        self.solver.is_convergence_failure(
            &self.engagement,
            self.shooter_velocity,
            self.iteration_budget,
        )
    }

    pub fn iterations_to_converge(&self) -> usize {
        self.solver
            .iterations_to_converge(&self.engagement, self.shooter_velocity, self.iteration_cap)
    }

    pub fn region(&self) -> RegionOfConvergence {
        compute_region_of_convergence(
            &self.engagement,
            self.solver,
            self.iteration_budget,
            &self.rays,
        )
    }

    pub fn reachability(&self) -> ReachabilityBoundary {
        compute_reachability_boundary(&self.engagement, &self.rays)
    }

    pub fn geodesic(&self) -> Vec<Vec<Velocity>> {
        geodesic_branches(&self.engagement, self.rays.velocity_ceiling)
    }

    pub fn heatmap(&self) -> HeatmapGrid {
        compute_heatmap(
            &self.engagement,
            self.solver,
            &self.window,
            self.resolution,
            self.iteration_cap,
        )
    }
}

/// Convert a validated `ScenarioConfig` into an analysis snapshot.
pub fn from_config(config: &ScenarioConfig) -> Result<AnalysisInputs, SessionError> {
    config.validate()?;
    let solver: SolverMethod = config.solver.parse()?;
    let engagement = Engagement::new(
        Point::new(config.shooter.x, config.shooter.y),
        Point::new(config.target.x, config.target.y),
        config.projectile_speed_m_s,
        config.tolerance_m,
    )?;
    let window = config
        .heatmap
        .window
        .map(|w| VelocityWindow {
            vx_min: w.vx_min,
            vx_max: w.vx_max,
            vy_min: w.vy_min,
            vy_max: w.vy_max,
        })
        .unwrap_or_default();

    Ok(AnalysisInputs {
        name: config.name.clone(),
        engagement,
        solver,
        shooter_velocity: Vec2::new(config.shooter_velocity.x, config.shooter_velocity.y),
        iteration_budget: config.iteration_budget,
        iteration_cap: config
            .iteration_cap
            .unwrap_or_else(|| solver.default_iteration_cap()),
        window,
        resolution: config.heatmap.resolution,
        rays: RaySettings {
            rays: config.region.rays,
            velocity_step: config.region.velocity_step,
            velocity_ceiling: config.region.velocity_ceiling,
        },
        settle: Duration::from_millis(config.heatmap.settle_ms),
    })
}
