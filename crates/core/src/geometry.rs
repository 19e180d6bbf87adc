//! Engagement geometry and the straight-line time-of-flight model.

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{NUMERICAL_FLOOR, TOF_FALLBACK_S};
use crate::vector::{Point, Vec2};

/// Errors raised while building geometry snapshots or evaluating time of flight.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("relative position ({x}, {y}) is not a number")]
    NotANumber { x: f64, y: f64 },
    #[error("time of flight is not finite (distance {distance_m} m, speed {speed_m_s} m/s)")]
    NonFiniteTimeOfFlight { distance_m: f64, speed_m_s: f64 },
    #[error("{which} position is not finite")]
    NonFinitePosition { which: &'static str },
    #[error("projectile speed must be positive and finite, got {0}")]
    InvalidProjectileSpeed(f64),
    #[error("convergence tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
    #[error("shooter and target coincide")]
    CoincidentPositions,
}

/// Flight time to cover `relative` at `projectile_speed`, or the reason it cannot be computed.
pub fn try_time_of_flight(relative: Vec2, projectile_speed: f64) -> Result<f64, GeometryError> {
    if relative.is_nan() {
        return Err(GeometryError::NotANumber {
            x: relative.x,
            y: relative.y,
        });
    }
    let distance = relative.length();
    let tof = distance / projectile_speed;
    if !tof.is_finite() {
        return Err(GeometryError::NonFiniteTimeOfFlight {
            distance_m: distance,
            speed_m_s: projectile_speed,
        });
    }
    Ok(tof)
}

/// Straight-line time of flight, `|relative| / projectile_speed`.
///
/// Invalid input is reported through the log and replaced by [`TOF_FALLBACK_S`] so that
/// NaN never propagates into later geometry.
pub fn time_of_flight(relative: Vec2, projectile_speed: f64) -> f64 {
    match try_time_of_flight(relative, projectile_speed) {
        Ok(tof) => tof,
        Err(err) => {
            warn!("time of flight fallback to {TOF_FALLBACK_S} s: {err}");
            TOF_FALLBACK_S
        }
    }
}

/// Immutable snapshot of one shooting problem: where the shooter and target are, how fast
/// the projectile flies, and how close a landing point must be to count as a hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub shooter: Point,
    pub target: Point,
    pub projectile_speed: f64,
    pub tolerance: f64,
}

impl Engagement {
    /// Build a validated snapshot.
    pub fn new(
        shooter: Point,
        target: Point,
        projectile_speed: f64,
        tolerance: f64,
    ) -> Result<Self, GeometryError> {
        if !shooter.is_finite() {
            return Err(GeometryError::NonFinitePosition { which: "shooter" });
        }
        if !target.is_finite() {
            return Err(GeometryError::NonFinitePosition { which: "target" });
        }
        if !(projectile_speed.is_finite() && projectile_speed > 0.0) {
            return Err(GeometryError::InvalidProjectileSpeed(projectile_speed));
        }
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(GeometryError::InvalidTolerance(tolerance));
        }
        if shooter.distance(&target) < NUMERICAL_FLOOR {
            return Err(GeometryError::CoincidentPositions);
        }
        Ok(Self {
            shooter,
            target,
            projectile_speed,
            tolerance,
        })
    }

    /// Target position relative to the shooter.
    #[inline]
    pub fn line_of_sight(&self) -> Vec2 {
        self.target - self.shooter
    }

    /// Bearing of the target from the shooter (radians).
    #[inline]
    pub fn bearing(&self) -> f64 {
        self.line_of_sight().angle()
    }

    /// Time of flight ignoring shooter motion.
    pub fn straight_line_tof(&self) -> f64 {
        time_of_flight(self.line_of_sight(), self.projectile_speed)
    }

    /// Distance between a landing point and the target.
    #[inline]
    pub fn landing_error(&self, landing: Point) -> f64 {
        landing.distance(&self.target)
    }

    /// Whether a landing point counts as a hit.
    #[inline]
    pub fn is_hit(&self, landing: Point) -> bool {
        self.landing_error(landing) <= self.tolerance
    }
}
