//! Conversion of analysis results into CSV rows and JSON sidecars.

use std::io::{self, Write};

use intercept_analysis::{HeatmapGrid, PolarSample};
use intercept_core::{Engagement, Velocity};
use intercept_export::sidecar::{EnvelopePoint, GridMeta, HeatmapSidecar, ScenarioMeta};
use intercept_export::{envelope, heatmap, trace};
use intercept_session::AnalysisInputs;
use intercept_solvers::IterationRecord;

/// Trace rows for `records`, with landing error measured against `engagement`.
pub fn trace_rows(engagement: &Engagement, records: &[IterationRecord]) -> Vec<trace::Record> {
    records
        .iter()
        .map(|r| trace::Record {
            iteration: r.iteration,
            tau_s: r.tau,
            tau_prev_s: r.tau_prev,
            virtual_target: (r.virtual_target.x, r.virtual_target.y),
            offset: (r.virtual_target_offset.x, r.virtual_target_offset.y),
            landing: (r.actual_trajectory_end.x, r.actual_trajectory_end.y),
            landing_error_m: r.landing_error(engagement),
            hit: engagement.is_hit(r.actual_trajectory_end),
        })
        .collect()
}

pub fn write_trace_csv(
    writer: &mut dyn Write,
    engagement: &Engagement,
    records: &[IterationRecord],
) -> io::Result<()> {
    trace::write_header(writer)?;
    for row in trace_rows(engagement, records) {
        row.write_to(writer)?;
    }
    Ok(())
}

/// Write every cell of `grid` in row-major order.
pub fn write_heatmap_csv(writer: &mut dyn Write, grid: &HeatmapGrid) -> io::Result<()> {
    heatmap::write_header(writer)?;
    for (row, col, iterations) in grid.iter() {
        let v = grid.velocity_at(row, col);
        heatmap::Record {
            row,
            col,
            vx_m_s: v.x,
            vy_m_s: v.y,
            iterations,
        }
        .write_to(writer)?;
    }
    Ok(())
}

pub fn write_envelope_csv(writer: &mut dyn Write, samples: &[PolarSample]) -> io::Result<()> {
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (s.angle_deg, s.max_velocity))
        .collect();
    envelope::write_curve(writer, &points)
}

fn envelope_points(samples: &[PolarSample]) -> Vec<EnvelopePoint> {
    samples
        .iter()
        .map(|s| EnvelopePoint {
            angle_deg: s.angle_deg,
            max_velocity_m_s: s.max_velocity,
        })
        .collect()
}

/// Sidecar describing `grid`, with the region, reachability and geodesic overlays of `inputs`.
pub fn build_sidecar(inputs: &AnalysisInputs, grid: &HeatmapGrid) -> HeatmapSidecar {
    let summary = grid.summary();
    let e = &inputs.engagement;
    let geodesic = inputs
        .geodesic()
        .into_iter()
        .map(|branch: Vec<Velocity>| branch.into_iter().map(|v| [v.x, v.y]).collect())
        .collect();
    HeatmapSidecar {
        scenario: ScenarioMeta {
            name: inputs.name.clone(),
            solver: inputs.solver.to_string(),
            shooter: [e.shooter.x, e.shooter.y],
            target: [e.target.x, e.target.y],
            projectile_speed_m_s: e.projectile_speed,
            tolerance_m: e.tolerance,
            iteration_budget: inputs.iteration_budget,
        },
        grid: GridMeta {
            vx_min: grid.window.vx_min,
            vx_max: grid.window.vx_max,
            vy_min: grid.window.vy_min,
            vy_max: grid.window.vy_max,
            resolution: grid.resolution,
            iteration_cap: grid.iteration_cap,
            min_iterations: summary.min_iterations,
            max_iterations: summary.max_iterations,
            converged_fraction: summary.converged_fraction,
        },
        region: envelope_points(&inputs.region().samples),
        reachability: envelope_points(&inputs.reachability().samples),
        geodesic,
    }
}
