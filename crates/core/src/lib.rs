//! Core units, constants, and shared primitives for the intercept calculator workspace.

pub mod geometry;
pub mod vector;

pub use geometry::{Engagement, GeometryError, time_of_flight, try_time_of_flight};
pub use vector::{Point, Vec2, Velocity};

/// Numerical constants shared by the solvers and analyses (SI units).
pub mod constants {
    /// Time-of-flight substituted when the input geometry is not a number (s).
    pub const TOF_FALLBACK_S: f64 = 1.0;
    /// Fixed-point settle threshold on successive flight-time estimates (s).
    pub const SETTLE_THRESHOLD_S: f64 = 0.01;
    /// Distances and derivatives below this are treated as zero.
    pub const NUMERICAL_FLOOR: f64 = 1e-10;
    /// Smallest flight time a Newton step may produce (s).
    pub const MIN_FLIGHT_TIME_S: f64 = 0.001;
    /// Largest shooter speed examined by the velocity-space analyses (m/s).
    pub const VELOCITY_CEILING_M_S: f64 = 20.0;
    /// Radial step of the region-of-convergence ray marcher (m/s).
    pub const VELOCITY_STEP_M_S: f64 = 0.05;
    /// Number of equally spaced rays cast around velocity space.
    pub const RAY_COUNT: usize = 360;
    /// Default iteration cap for the Newton-Raphson solver.
    pub const NEWTON_ITERATION_CAP: usize = 20;
    /// Default iteration cap for the fixed-point solver.
    pub const FIXED_POINT_ITERATION_CAP: usize = 1000;
}

/// Angle helpers (radians).
pub mod units {
    use std::f64::consts::{PI, TAU};

    /// Wrap an angle in radians into `[-π, π]`.
    pub fn wrap_pi(angle: f64) -> f64 {
        let mut a = angle % TAU;
        if a > PI {
            a -= TAU;
        } else if a < -PI {
            a += TAU;
        }
        a
    }

}
