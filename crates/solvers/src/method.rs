//! Solver selection and the convergence classifier shared by both solvers.

use std::fmt;
use std::str::FromStr;

use intercept_core::constants::{FIXED_POINT_ITERATION_CAP, NEWTON_ITERATION_CAP};
use intercept_core::{Engagement, Velocity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fixed_point::run_fixed_point_iterations;
use crate::newton::{newton_iterations_to_convergence, run_newton_iterations};
use crate::record::IterationRecord;

/// Which intercept solver answers a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverMethod {
    FixedPoint,
    #[default]
    Newton,
}

#[derive(Debug, Error)]
#[error("unknown solver method '{0}' (expected 'fixed-point' or 'newton')")]
pub struct ParseSolverMethodError(String);

impl SolverMethod {
    pub const ALL: [SolverMethod; 2] = [SolverMethod::FixedPoint, SolverMethod::Newton];

    /// Iteration cap used when none is configured.
    pub fn default_iteration_cap(self) -> usize {
        match self {
            SolverMethod::FixedPoint => FIXED_POINT_ITERATION_CAP,
            SolverMethod::Newton => NEWTON_ITERATION_CAP,
        }
    }

    /// Full per-step trace, at most `max_iter` records.
    pub fn run(
        self,
        engagement: &Engagement,
        shooter_velocity: Velocity,
        max_iter: usize,
    ) -> Vec<IterationRecord> {
        match self {
            SolverMethod::FixedPoint => {
                run_fixed_point_iterations(engagement, shooter_velocity, max_iter)
            }
            SolverMethod::Newton => run_newton_iterations(engagement, shooter_velocity, max_iter),
        }
    }

    /// Whether the last landing point of a `max_iter` run misses the target. An empty trace
    /// counts as a failure.
    pub fn is_convergence_failure(
        self,
        engagement: &Engagement,
        shooter_velocity: Velocity,
        max_iter: usize,
    ) -> bool {
        match self.run(engagement, shooter_velocity, max_iter).last() {
            Some(last) => !engagement.is_hit(last.actual_trajectory_end),
            None => true,
        }
    }

    /// First 1-based step whose landing point hits the target, or `max_iter` if none does.
    pub fn iterations_to_converge(
        self,
        engagement: &Engagement,
        shooter_velocity: Velocity,
        max_iter: usize,
    ) -> usize {
        match self {
            SolverMethod::FixedPoint => {
                run_fixed_point_iterations(engagement, shooter_velocity, max_iter)
                    .iter()
                    .find(|record| engagement.is_hit(record.actual_trajectory_end))
                    .map(|record| record.iteration)
                    .unwrap_or(max_iter)
            }
            SolverMethod::Newton => {
                newton_iterations_to_convergence(engagement, shooter_velocity, max_iter)
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverMethod::FixedPoint => "fixed-point",
            SolverMethod::Newton => "newton",
        }
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverMethod {
    type Err = ParseSolverMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "fixed-point" | "fixed" => Ok(SolverMethod::FixedPoint),
            "newton" | "newton-raphson" => Ok(SolverMethod::Newton),
            _ => Err(ParseSolverMethodError(s.to_string())),
        }
    }
}
