//! Solve target and objective function.

use crate::tank::TankSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Weight of the total-weight term relative to the center-of-gravity terms
/// in the objective. Keeping the weight term subordinate lets the solver
/// trade a little total weight for a much better center of gravity.
pub const WEIGHT_TERM_FACTOR: f64 = 0.1;

/// Target state for a ballast solve: where the combined center of gravity
/// should sit in the two horizontal axes, and how much total ballast weight
/// should be on board.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BallastTarget {
    /// Target center of gravity, x axis.
    pub cog_x: f64,
    /// Target center of gravity, y axis.
    pub cog_y: f64,
    /// Target total ballast weight.
    pub weight: f64,
}

impl BallastTarget {
    /// Creates a new target.
    pub fn new(cog_x: f64, cog_y: f64, weight: f64) -> Self {
        Self {
            cog_x,
            cog_y,
            weight,
        }
    }

    /// Weighted squared deviation of the tank set from this target.
    ///
    /// `(cog_x - target_x)^2 + (cog_y - target_y)^2 +
    ///  WEIGHT_TERM_FACTOR * (weight - target_weight)^2`
    ///
    /// Recomputed fresh from the current fill state on every call; fill
    /// levels change behind this function's back during a solve, so nothing
    /// may be cached.
    pub fn objective(&self, tanks: &TankSet) -> f64 {
        let (dx, dy, dw) = self.residuals(tanks);
        dx * dx + dy * dy + WEIGHT_TERM_FACTOR * dw * dw
    }

    /// Raw deviations `(cog_x, cog_y, weight)` from the target.
    pub fn residuals(&self, tanks: &TankSet) -> (f64, f64, f64) {
        let cog = tanks.center_of_gravity();
        (
            cog.x - self.cog_x,
            cog.y - self.cog_y,
            tanks.total_weight() - self.weight,
        )
    }
}

impl std::fmt::Display for BallastTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cog=({}, {}), weight={}",
            self.cog_x, self.cog_y, self.weight
        )
    }
}
