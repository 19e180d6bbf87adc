//! Velocity-space heat-map sampler and its colour scale.

use std::time::Instant;

use intercept_core::{Engagement, Vec2, Velocity};
use intercept_solvers::SolverMethod;
use log::debug;
use serde::{Deserialize, Serialize};

/// Round figures offered as legend ticks.
const LEGEND_CANDIDATES: [usize; 10] = [1, 2, 5, 10, 20, 50, 100, 200, 500, 1000];

/// Rectangular sampling window in velocity space (m/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityWindow {
    pub vx_min: f64,
    pub vx_max: f64,
    pub vy_min: f64,
    pub vy_max: f64,
}

impl Default for VelocityWindow {
    fn default() -> Self {
        Self::symmetric(intercept_core::constants::VELOCITY_CEILING_M_S / 2.0)
    }
}

impl VelocityWindow {
    /// Square window centred on zero velocity.
    pub fn symmetric(half_extent: f64) -> Self {
        Self::centered(Vec2::ZERO, half_extent)
    }

    pub fn centered(center: Velocity, half_extent: f64) -> Self {
        Self {
            vx_min: center.x - half_extent,
            vx_max: center.x + half_extent,
            vy_min: center.y - half_extent,
            vy_max: center.y + half_extent,
        }
    }

    pub fn width(&self) -> f64 {
        self.vx_max - self.vx_min
    }

    pub fn height(&self) -> f64 {
        self.vy_max - self.vy_min
    }

    /// Finite bounds with positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        [self.vx_min, self.vx_max, self.vy_min, self.vy_max]
            .iter()
            .all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }

    /// Velocity at the centre of cell `(row, col)`; row 0 is the top (largest `vy`).
    pub fn cell_center(&self, row: usize, col: usize, resolution: usize) -> Velocity {
        let res = resolution.max(1) as f64;
        let step_x = self.width() / res;
        let step_y = self.height() / res;
        Vec2::new(
            self.vx_min + (col as f64 + 0.5) * step_x,
            self.vy_max - (row as f64 + 0.5) * step_y,
        )
    }

    /// `(row, col)` of the cell containing `velocity`, if it lies inside the window.
    pub fn cell_for(&self, velocity: Velocity, resolution: usize) -> Option<(usize, usize)> {
        if resolution == 0 || !self.is_valid() || !velocity.is_finite() {
            return None;
        }
        let res = resolution as f64;
        let col = ((velocity.x - self.vx_min) / self.width() * res).floor();
        let row = ((self.vy_max - velocity.y) / self.height() * res).floor();
        if (0.0..res).contains(&col) && (0.0..res).contains(&row) {
            Some((row as usize, col as usize))
        } else {
            None
        }
    }
}

/// Iteration counts over a velocity window, `cells[row][col]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapGrid {
    pub window: VelocityWindow,
    pub resolution: usize,
    pub iteration_cap: usize,
    pub solver: SolverMethod,
    pub cells: Vec<Vec<usize>>,
}

/// Aggregate view of a heat-map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSummary {
    pub min_iterations: usize,
    pub max_iterations: usize,
    /// Share of cells that converged before the cap.
    pub converged_fraction: f64,
}

impl HeatmapGrid {
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn velocity_at(&self, row: usize, col: usize) -> Velocity {
        self.window.cell_center(row, col, self.resolution)
    }

    /// Iterate `(row, col, iterations)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, &iterations)| (row, col, iterations))
        })
    }

    pub fn summary(&self) -> HeatmapSummary {
        let mut min_iterations = usize::MAX;
        let mut max_iterations = 0;
        let mut converged = 0usize;
        let mut total = 0usize;
        for (_, _, k) in self.iter() {
            min_iterations = min_iterations.min(k);
            max_iterations = max_iterations.max(k);
            if k < self.iteration_cap {
                converged += 1;
            }
            total += 1;
        }
        if total == 0 {
            return HeatmapSummary {
                min_iterations: 0,
                max_iterations: 0,
                converged_fraction: 0.0,
            };
        }
        HeatmapSummary {
            min_iterations,
            max_iterations,
            converged_fraction: converged as f64 / total as f64,
        }
    }
}

/// Evaluate the fast convergence counter at every cell centre of `window`.
///
/// Counts lie in `[1, max_iter]` (a zero cap is treated as one).
pub fn compute_heatmap(
    engagement: &Engagement,
    solver: SolverMethod,
    window: &VelocityWindow,
    resolution: usize,
    max_iter: usize,
) -> HeatmapGrid {
    let started = Instant::now();
    let cap = max_iter.max(1);
    let cells = (0..resolution)
        .map(|row| {
            (0..resolution)
                .map(|col| {
                    let velocity = window.cell_center(row, col, resolution);
                    solver
                        .iterations_to_converge(engagement, velocity, cap)
                        .clamp(1, cap)
                })
                .collect()
        })
        .collect();
    let grid = HeatmapGrid {
        window: *window,
        resolution,
        iteration_cap: cap,
        solver,
        cells,
    };
    let summary = grid.summary();
    debug!(
        "heatmap {resolution}x{resolution} solver={solver} cap={cap}: iterations {}..={} converged {:.1}% in {:?}",
        summary.min_iterations,
        summary.max_iterations,
        summary.converged_fraction * 100.0,
        started.elapsed()
    );
    grid
}

/// RGB shade for an iteration count: dark green at one iteration, white at the cap, on a
/// logarithmic scale.
pub fn iteration_shade(iterations: usize, cap: usize) -> [u8; 3] {
    let t = if cap <= 1 {
        0.0
    } else {
        ((iterations.max(1) as f64).ln() / (cap as f64).ln()).clamp(0.0, 1.0)
    };
    let channel = |base: f64| (base + t * (255.0 - base)).round() as u8;
    [channel(0.0), channel(68.0), channel(27.0)]
}

/// Legend ticks not exceeding `cap`.
pub fn legend_ticks(cap: usize) -> Vec<usize> {
    LEGEND_CANDIDATES
        .iter()
        .copied()
        .filter(|&tick| tick <= cap)
        .collect()
}
