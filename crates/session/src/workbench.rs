//! Editable analysis state with immediate cheap recomputes and a debounced heat-map.

use std::time::Instant;

use intercept_analysis::{
    HeatmapGrid, RaySettings, ReachabilityBoundary, RegionOfConvergence, VelocityWindow,
};
use intercept_core::{Engagement, Point, Vec2, Velocity};
use intercept_solvers::{IterationRecord, SolverMethod};
use log::{debug, warn};

use crate::SessionError;
use crate::debounce::Debouncer;
use crate::inputs::{AnalysisInputs, DEFAULT_ITERATION_BUDGET, DEFAULT_RESOLUTION, DEFAULT_SETTLE};

const DEFAULT_PROJECTILE_SPEED: f64 = 3.5;
const DEFAULT_TOLERANCE: f64 = 0.1;

/// State a presentation layer edits, plus the artifacts derived from it.
///
/// Setters take the current instant. Geometry, solver and budget changes recompute the region
/// and reachability curves at once; every effective change (re)schedules the heat-map, which
/// [`Workbench::poll`] computes only after the settle window passes without another change.
/// The heat-map cap, window and resolution only reschedule the heat-map. Setting a value equal
/// to the current one does nothing.
#[derive(Debug)]
pub struct Workbench {
    shooter: Option<Point>,
    target: Option<Point>,
    projectile_speed: f64,
    tolerance: f64,
    solver: SolverMethod,
    shooter_velocity: Velocity,
    iteration_budget: usize,
    iteration_cap: usize,
    window: VelocityWindow,
    resolution: usize,
    rays: RaySettings,
    region: Option<RegionOfConvergence>,
    reachability: Option<ReachabilityBoundary>,
    heatmap: Option<HeatmapGrid>,
    heatmap_task: Debouncer<AnalysisInputs>,
    heatmap_runs: usize,
    curve_runs: usize,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbench {
    /// Empty workbench: no geometry yet, default parameters.
    pub fn new() -> Self {
        let solver = SolverMethod::default();
        Self {
            shooter: None,
            target: None,
            projectile_speed: DEFAULT_PROJECTILE_SPEED,
            tolerance: DEFAULT_TOLERANCE,
            solver,
            shooter_velocity: Vec2::ZERO,
            iteration_budget: DEFAULT_ITERATION_BUDGET,
            iteration_cap: solver.default_iteration_cap(),
            window: VelocityWindow::default(),
            resolution: DEFAULT_RESOLUTION,
            rays: RaySettings::default(),
            region: None,
            reachability: None,
            heatmap: None,
            heatmap_task: Debouncer::new(DEFAULT_SETTLE),
            heatmap_runs: 0,
            curve_runs: 0,
        }
    }

    /// Workbench seeded from a snapshot; curves are computed and a heat-map scheduled.
    pub fn from_inputs(inputs: &AnalysisInputs, now: Instant) -> Self {
        let mut bench = Self {
            shooter: Some(inputs.engagement.shooter),
            target: Some(inputs.engagement.target),
            projectile_speed: inputs.engagement.projectile_speed,
            tolerance: inputs.engagement.tolerance,
            solver: inputs.solver,
            shooter_velocity: inputs.shooter_velocity,
            iteration_budget: inputs.iteration_budget,
            iteration_cap: inputs.iteration_cap,
            window: inputs.window,
            resolution: inputs.resolution,
            rays: inputs.rays,
            heatmap_task: Debouncer::new(inputs.settle),
            ..Self::new()
        };
        bench.refresh(now);
        bench
    }

    pub fn set_shooter(&mut self, shooter: Point, now: Instant) -> bool {
        if self.shooter == Some(shooter) {
            return false;
        }
        self.shooter = Some(shooter);
        self.refresh(now);
        true
    }

    pub fn set_target(&mut self, target: Point, now: Instant) -> bool {
        if self.target == Some(target) {
            return false;
        }
        self.target = Some(target);
        self.refresh(now);
        true
    }

    pub fn set_projectile_speed(&mut self, speed: f64, now: Instant) -> bool {
        if self.projectile_speed == speed {
            return false;
        }
        self.projectile_speed = speed;
        self.refresh(now);
        true
    }

    pub fn set_tolerance(&mut self, tolerance: f64, now: Instant) -> bool {
        if self.tolerance == tolerance {
            return false;
        }
        self.tolerance = tolerance;
        self.refresh(now);
        true
    }

    /// Switch solver; the heat-map cap resets to the new solver's default.
    pub fn set_solver(&mut self, solver: SolverMethod, now: Instant) -> bool {
        if self.solver == solver {
            return false;
        }
        self.solver = solver;
        self.iteration_cap = solver.default_iteration_cap();
        self.refresh(now);
        true
    }

    pub fn set_iteration_budget(&mut self, budget: usize, now: Instant) -> bool {
        if self.iteration_budget == budget {
            return false;
        }
        self.iteration_budget = budget;
        self.refresh(now);
        true
    }

    pub fn set_iteration_cap(&mut self, cap: usize, now: Instant) -> bool {
        if self.iteration_cap == cap {
            return false;
        }
        self.iteration_cap = cap;
        self.reschedule_heatmap(now);
        true
    }

    pub fn set_window(&mut self, window: VelocityWindow, now: Instant) -> bool {
        if self.window == window {
            return false;
        }
        self.window = window;
        self.reschedule_heatmap(now);
        true
    }

    pub fn set_resolution(&mut self, resolution: usize, now: Instant) -> bool {
        if self.resolution == resolution {
            return false;
        }
        self.resolution = resolution;
        self.reschedule_heatmap(now);
        true
    }

    /// The shooter velocity only feeds traces and classification, so nothing is recomputed.
    pub fn set_shooter_velocity(&mut self, velocity: Velocity) {
        self.shooter_velocity = velocity;
    }

    /// Snapshot of the current state, or why none can be built.
    pub fn snapshot(&self) -> Result<AnalysisInputs, SessionError> {
        let (Some(shooter), Some(target)) = (self.shooter, self.target) else {
            return Err(SessionError::MissingGeometry);
        };
        let engagement = Engagement::new(shooter, target, self.projectile_speed, self.tolerance)?;
        Ok(AnalysisInputs {
            name: String::new(),
            engagement,
            solver: self.solver,
            shooter_velocity: self.shooter_velocity,
            iteration_budget: self.iteration_budget,
            iteration_cap: self.iteration_cap,
            window: self.window,
            resolution: self.resolution,
            rays: self.rays,
            settle: self.heatmap_task.settle(),
        })
    }

    /// Recompute the curves and reschedule the heat-map.
    fn refresh(&mut self, now: Instant) {
        self.apply(now, true);
    }

    /// Reschedule the heat-map, keeping the curves.
    fn reschedule_heatmap(&mut self, now: Instant) {
        self.apply(now, false);
    }

    fn apply(&mut self, now: Instant, curves: bool) {
        match self.snapshot() {
            Ok(inputs) => {
                if curves {
                    self.region = Some(inputs.region());
                    self.reachability = Some(inputs.reachability());
                    self.curve_runs += 1;
                }
                self.heatmap_task.schedule(inputs, now);
            }
            Err(SessionError::MissingGeometry) => {
                debug!("workbench: geometry incomplete, analyses skipped");
                self.clear_artifacts();
            }
            Err(err) => {
                warn!("workbench: cannot analyse current state: {err}");
                self.clear_artifacts();
            }
        }
    }

    fn clear_artifacts(&mut self) {
        self.region = None;
        self.reachability = None;
        self.heatmap = None;
        if let Some(handle) = self.heatmap_task.pending_handle() {
            self.heatmap_task.cancel(handle);
        }
    }

    /// Run the deferred heat-map if its settle window has elapsed. Returns whether it ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.heatmap_task.poll(now) {
            Some(inputs) => {
                self.heatmap = Some(inputs.heatmap());
                self.heatmap_runs += 1;
                true
            }
            None => false,
        }
    }

    pub fn heatmap_pending(&self) -> bool {
        self.heatmap_task.is_pending()
    }

    /// Number of heat-maps computed so far.
    pub fn heatmap_runs(&self) -> usize {
        self.heatmap_runs
    }

    /// Number of region/reachability recomputes so far.
    pub fn curve_runs(&self) -> usize {
        self.curve_runs
    }

    pub fn region(&self) -> Option<&RegionOfConvergence> {
        self.region.as_ref()
    }

    pub fn reachability(&self) -> Option<&ReachabilityBoundary> {
        self.reachability.as_ref()
    }

    pub fn heatmap(&self) -> Option<&HeatmapGrid> {
        self.heatmap.as_ref()
    }

    pub fn solver(&self) -> SolverMethod {
        self.solver
    }

    pub fn iteration_cap(&self) -> usize {
        self.iteration_cap
    }

    /// Trace at the current budget; empty without valid geometry.
    pub fn trace(&self) -> Vec<IterationRecord> {
        self.snapshot()
            .map(|inputs| inputs.trace())
            .unwrap_or_default()
    }

    /// Classification at the current budget; failure without valid geometry.
    pub fn is_convergence_failure(&self) -> bool {
        self.snapshot()
            .map(|inputs| inputs.is_convergence_failure())
            .unwrap_or(true)
    }

    /// Iterations needed under the heat-map cap; the cap itself without valid geometry.
    pub fn iterations_to_converge(&self) -> usize {
        self.snapshot()
            .map(|inputs| inputs.iterations_to_converge())
            .unwrap_or(self.iteration_cap)
    }
}
