use intercept_core::{Engagement, Point, Vec2};
use serde::Serialize;

/// One solver step. Produced by a solver run and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationRecord {
    /// 1-based step index.
    pub iteration: usize,
    /// Target position relative to the shooter looked up at this step.
    pub relative_position: Vec2,
    /// Flight time estimate produced by this step (s).
    pub tau: f64,
    /// Flight time estimate this step started from (s).
    pub tau_prev: f64,
    /// Aim point compensating for the shooter's own motion.
    pub virtual_target: Point,
    /// `virtual_target - target`.
    pub virtual_target_offset: Vec2,
    /// Where the projectile lands once the shooter's motion during flight is accounted for.
    pub actual_trajectory_end: Point,
}

impl IterationRecord {
    /// Distance between this step's landing point and the target.
    pub fn landing_error(&self, engagement: &Engagement) -> f64 {
        engagement.landing_error(self.actual_trajectory_end)
    }
}
