//! Intercept solvers: fixed-point iteration and Newton-Raphson on the implicit time-of-flight
//! equation, plus the solver-agnostic convergence classifier built on top of them.

pub mod fixed_point;
pub mod method;
pub mod newton;
pub mod record;

pub use fixed_point::run_fixed_point_iterations;
pub use method::{ParseSolverMethodError, SolverMethod};
pub use newton::{newton_iterations_to_convergence, run_newton_iterations};
pub use record::IterationRecord;
