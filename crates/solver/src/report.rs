//! Solve result representation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Summary of a successful solve.
///
/// The mutated fill levels live on the tank set the solver was given; this
/// report only carries diagnostics about how the solve went.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveReport {
    /// Driver iterations completed before convergence.
    pub iterations: usize,

    /// Objective value at convergence.
    pub final_error: f64,

    /// Objective value at the top of each iteration, ending with the
    /// converged value. Useful for analyzing descent behavior.
    pub error_history: Vec<f64>,

    /// Wall-clock solve time in milliseconds.
    pub elapsed_ms: u64,
}

impl SolveReport {
    /// Objective value before the first optimization step, if any iteration
    /// ran.
    pub fn initial_error(&self) -> Option<f64> {
        self.error_history.first().copied()
    }

    /// Total objective reduction achieved by the solve.
    pub fn improvement(&self) -> f64 {
        match self.initial_error() {
            Some(initial) => initial - self.final_error,
            None => 0.0,
        }
    }
}
