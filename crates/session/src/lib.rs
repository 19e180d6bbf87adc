//! Session layer shared by the binaries and any interactive front-end.
//!
//! [`AnalysisInputs`] is the immutable snapshot every computation reads, [`Debouncer`] defers
//! the expensive heat-map until parameter changes settle, and [`Workbench`] ties both to the
//! mutable state a presentation layer edits.

pub mod debounce;
pub mod inputs;
pub mod workbench;

use intercept_config::ConfigError;
use intercept_core::GeometryError;
use intercept_solvers::ParseSolverMethodError;
use thiserror::Error;

pub use debounce::{Debouncer, TaskHandle};
pub use inputs::{AnalysisInputs, from_config};
pub use workbench::Workbench;

/// Errors surfaced when turning configuration or editor state into an analysis snapshot.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("shooter and target positions must both be set")]
    MissingGeometry,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Solver(#[from] ParseSolverMethodError),
}
