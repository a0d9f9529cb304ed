//! Solver configuration.

use ballast_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for [`BallastSolver`](crate::BallastSolver).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Convergence threshold on the objective value.
    pub tolerance: f64,

    /// Minimum strict objective decrease for a move to count as improving.
    /// Keeps the solver from accepting an endless stream of microscopic
    /// improvements. `None` resolves to `tolerance / 25`.
    pub min_error_reduction: Option<f64>,

    /// Hard cap on driver iterations. Exceeding it is a fatal failure.
    pub max_iterations: usize,

    /// Diagnostic verbosity: 0 = silent, 1 = per-iteration summary,
    /// 2+ = per-strategy detail. Has no effect on numeric behavior.
    pub verbosity: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            min_error_reduction: None,
            max_iterations: 100,
            verbosity: 0,
        }
    }
}

impl SolverConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the minimum accepted error reduction.
    pub fn with_min_error_reduction(mut self, reduction: f64) -> Self {
        self.min_error_reduction = Some(reduction);
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the diagnostic verbosity.
    pub fn with_verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The effective minimum error reduction.
    pub fn resolved_min_error_reduction(&self) -> f64 {
        self.min_error_reduction
            .unwrap_or(self.tolerance / 25.0)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if let Some(reduction) = self.min_error_reduction {
            if !reduction.is_finite() || reduction < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "min_error_reduction must be non-negative, got {reduction}"
                )));
            }
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_config_defaults() {
        let config = SolverConfig::default();
        assert_relative_eq!(config.tolerance, 1e-3);
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.verbosity, 0);
        assert!(config.min_error_reduction.is_none());
    }

    #[test]
    fn test_min_error_reduction_defaults_to_tolerance_fraction() {
        let config = SolverConfig::new().with_tolerance(2.5e-2);
        assert_relative_eq!(config.resolved_min_error_reduction(), 1e-3);
    }

    #[test]
    fn test_explicit_min_error_reduction_wins() {
        let config = SolverConfig::new().with_min_error_reduction(1e-6);
        assert_relative_eq!(config.resolved_min_error_reduction(), 1e-6);
    }

    #[test]
    fn test_config_builder() {
        let config = SolverConfig::new()
            .with_tolerance(1e-4)
            .with_max_iterations(50)
            .with_verbosity(2);
        assert_relative_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        assert!(SolverConfig::new().with_tolerance(0.0).validate().is_err());
        assert!(SolverConfig::new().with_tolerance(-1.0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        assert!(SolverConfig::new()
            .with_max_iterations(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(SolverConfig::default().validate().is_ok());
    }
}
