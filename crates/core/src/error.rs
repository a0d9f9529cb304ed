//! Error types for the ballast crates.

use thiserror::Error;

/// Errors produced by the ballast data model and solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A tank violates a construction invariant (capacity, level, position).
    #[error("invalid tank '{id}': {reason}")]
    InvalidTank {
        /// Identifier of the offending tank.
        id: String,
        /// Human-readable description of the violation.
        reason: String,
    },

    /// The solver configuration is unusable.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// No optimization strategy could change the tank state. The target is
    /// not reachable with the given tank capacities and positions.
    #[error("optimization failed after {iterations} iterations: no strategy could improve the state (residual error {error:.6e})")]
    SolverExhausted {
        /// Iterations completed before exhaustion.
        iterations: usize,
        /// Objective value at the point of failure.
        error: f64,
    },

    /// The iteration budget ran out before the objective dropped below
    /// tolerance.
    #[error("optimization did not converge within {limit} iterations (residual error {error:.6e})")]
    IterationLimit {
        /// The configured iteration cap.
        limit: usize,
        /// Objective value when the cap was hit.
        error: f64,
    },
}

/// Result type alias for ballast operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidTank {
            id: "FW1".to_string(),
            reason: "capacity must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid tank 'FW1': capacity must be positive"
        );
    }

    #[test]
    fn test_exhausted_display_mentions_iterations() {
        let err = Error::SolverExhausted {
            iterations: 7,
            error: 12.5,
        };
        assert!(err.to_string().contains("7 iterations"));
    }

    #[test]
    fn test_iteration_limit_display() {
        let err = Error::IterationLimit {
            limit: 100,
            error: 0.5,
        };
        assert!(err.to_string().contains("100 iterations"));
    }
}
