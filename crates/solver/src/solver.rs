//! Layered ballast distribution solver.
//!
//! [`BallastSolver`] mutates the fill levels of unfrozen tanks in a
//! [`TankSet`] until the combined center of gravity and total weight match a
//! [`BallastTarget`] within tolerance.
//!
//! Each driver iteration tries progressively more expensive strategies:
//!
//! 1. Optimize a single partial tank on its own.
//! 2. Jointly optimize all partial tanks, preferring moves that collapse a
//!    tank to empty or full over a continuous fit.
//! 3. Sweep the remaining free tanks one at a time.
//! 4. Grow the partial set by one candidate tank.
//! 5. Jointly optimize the partial set plus every pair of candidate tanks
//!    consistent with the needed weight change.
//!
//! Every trial mutation is applied in place and rolled back from a level
//! snapshot unless accepted. Accepted moves never increase the objective; a
//! move that keeps the objective equal is accepted only when it collapses a
//! tank to an extreme, because a distribution with fewer partial tanks is
//! the structurally simpler solution.

use crate::config::SolverConfig;
use crate::report::SolveReport;
use ballast_core::minimize::{
    minimize_scalar_bounded, minimize_vector_bounded, ScalarOptions, VectorOptions,
};
use ballast_core::{BallastTarget, Error, Result, TankSet, EMPTY_LEVEL, FULL_LEVEL};
use std::time::Instant;

/// Ballast distribution solver.
///
/// The solver owns no tank state; it exclusively borrows a [`TankSet`] for
/// the duration of one [`solve`](BallastSolver::solve) call and leaves the
/// solved fill levels on it.
///
/// # Example
///
/// ```rust
/// use ballast_core::{BallastTarget, Tank, TankSet};
/// use ballast_solver::{BallastSolver, SolverConfig};
/// use nalgebra::Point3;
///
/// let mut tanks: TankSet = vec![
///     Tank::new("FWD", 100.0, Point3::new(0.0, 0.0, 0.0)),
///     Tank::new("AFT", 100.0, Point3::new(10.0, 0.0, 0.0)),
/// ]
/// .into_iter()
/// .collect();
///
/// let solver = BallastSolver::new(SolverConfig::default());
/// let report = solver
///     .solve(&mut tanks, &BallastTarget::new(5.0, 0.0, 100.0))
///     .expect("target is reachable");
/// assert!(report.final_error < 1e-3);
/// ```
pub struct BallastSolver {
    config: SolverConfig,
    scalar_options: ScalarOptions,
    vector_options: VectorOptions,
}

impl BallastSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            scalar_options: ScalarOptions::default(),
            vector_options: VectorOptions::default(),
        }
    }

    /// Creates a solver with the default configuration.
    pub fn default_config() -> Self {
        Self::new(SolverConfig::default())
    }

    /// The solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Drives the tank set towards the target.
    ///
    /// On success the solved fill levels are left on `tanks` and a
    /// [`SolveReport`] describes the solve. On failure the tank set keeps
    /// the best state reached; [`Error::SolverExhausted`] means no strategy
    /// could change the state (the target is infeasible for the tank
    /// envelope), [`Error::IterationLimit`] means the budget ran out first.
    pub fn solve(&self, tanks: &mut TankSet, target: &BallastTarget) -> Result<SolveReport> {
        self.config.validate()?;
        tanks.validate()?;

        let start = Instant::now();
        let mut history = Vec::with_capacity(self.config.max_iterations);

        for iteration in 0..self.config.max_iterations {
            let error = target.objective(tanks);
            history.push(error);

            if error < self.config.tolerance {
                if self.config.verbosity >= 1 {
                    log::info!(
                        "converged after {} iterations, error {:.6e}",
                        iteration,
                        error
                    );
                }
                return Ok(SolveReport {
                    iterations: iteration,
                    final_error: error,
                    error_history: history,
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }

            let free = tanks.free_indices();
            let partials = tanks.partial_indices();
            if self.config.verbosity >= 1 {
                log::info!(
                    "iteration {}: error {:.6e} ({} partial of {} free tanks)",
                    iteration,
                    error,
                    partials.len(),
                    free.len()
                );
            }

            if !self.step(tanks, target, &free, &partials, error) {
                return Err(Error::SolverExhausted {
                    iterations: iteration,
                    error,
                });
            }
        }

        let error = target.objective(tanks);
        Err(Error::IterationLimit {
            limit: self.config.max_iterations,
            error,
        })
    }

    /// Runs one driver iteration. Returns whether any strategy changed the
    /// tank state.
    fn step(
        &self,
        tanks: &mut TankSet,
        target: &BallastTarget,
        free: &[usize],
        partials: &[usize],
        error_at_start: f64,
    ) -> bool {
        // Work the partial tanks first; they are the cheapest lever.
        match partials.len() {
            1 => {
                if self.optimize_tank(tanks, target, partials[0]) {
                    self.trace("single partial tank optimized");
                    return true;
                }
            }
            n if n > 1 => {
                if self.optimize_partial_set(tanks, target, partials) {
                    self.trace("partial tank set optimized");
                    return true;
                }
            }
            _ => {}
        }

        // Sweep the tanks currently at an extreme, one at a time.
        for &index in free {
            if tanks[index].is_partial() {
                continue;
            }
            if self.optimize_tank(tanks, target, index) {
                self.trace("pool sweep optimized a tank");
                return true;
            }
        }

        // Grow the partial set by one tank and optimize the union.
        for &index in free {
            if partials.contains(&index) {
                continue;
            }
            let mut subset = partials.to_vec();
            subset.push(index);
            if self.optimize_partial_set(tanks, target, &subset) {
                self.trace("partial set grown by one tank");
                return true;
            }
        }

        // Expensive fallback: bring in a pair of tanks able to move the
        // total weight in the needed direction and fit everything jointly.
        let filling = tanks.total_weight() < target.weight;
        let candidates: Vec<usize> = free
            .iter()
            .copied()
            .filter(|index| !partials.contains(index))
            .filter(|&index| {
                if filling {
                    !tanks[index].is_full()
                } else {
                    !tanks[index].is_empty()
                }
            })
            .collect();

        for (position, &a) in candidates.iter().enumerate() {
            for &b in &candidates[position + 1..] {
                let snapshot = tanks.levels();
                let mut subset = partials.to_vec();
                subset.push(a);
                subset.push(b);

                let error = self.run_joint_minimization(tanks, target, &subset);
                if error <= error_at_start && tanks.levels() != snapshot {
                    self.trace("pair fallback accepted");
                    return true;
                }
                tanks.restore_levels(&snapshot);
            }
        }

        false
    }

    /// Finds the fill level for one free tank that best reduces the
    /// objective, with all other tanks held fixed.
    ///
    /// Tries full, then empty, then a bounded scalar minimization over the
    /// whole fill range. An extreme is kept when it improves the objective
    /// by at least the configured minimum reduction, or when the tank was
    /// partial before the trial (trading a partial tank for a collapsed one
    /// at no cost simplifies the distribution). The continuous optimum is
    /// kept only on a strict improvement.
    ///
    /// Returns whether the tank's level changed. On failure the level is
    /// restored exactly. Frozen tanks are never touched.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn optimize_tank(&self, tanks: &mut TankSet, target: &BallastTarget, index: usize) -> bool {
        if tanks[index].is_frozen() {
            return false;
        }

        let level0 = tanks[index].level();
        let was_partial = tanks[index].is_partial();
        let e0 = target.objective(tanks);
        let min_reduction = self.config.resolved_min_error_reduction();

        // Extremes first, full before empty.
        for extreme in [FULL_LEVEL, EMPTY_LEVEL] {
            tanks[index].set_level(extreme);
            let error = target.objective(tanks);
            if error < e0 && (e0 - error >= min_reduction || was_partial) {
                self.trace_tank(tanks, index, "collapsed");
                return true;
            }
        }

        let minimum = minimize_scalar_bounded(
            |level| {
                tanks[index].set_level(level);
                target.objective(tanks)
            },
            (EMPTY_LEVEL, FULL_LEVEL),
            &self.scalar_options,
        );
        if !minimum.converged {
            log::warn!(
                "scalar minimization did not converge for tank '{}' after {} iterations",
                tanks[index].id(),
                minimum.iterations
            );
        }

        tanks[index].set_level(minimum.x);
        let error = target.objective(tanks);
        if error < e0 - min_reduction {
            self.trace_tank(tanks, index, "moved to continuous optimum");
            true
        } else {
            tanks[index].set_level(level0);
            false
        }
    }

    /// Optimizes a set of free tanks together.
    ///
    /// Collapse moves are always tried before a continuous joint fit:
    /// driving one tank of the set to empty or full and re-optimizing the
    /// rest is accepted whenever it does not worsen the objective, because
    /// the collapsed state is structurally preferable at equal error. Only
    /// when no collapse move is acceptable does the solver fall back to a
    /// bounded joint minimization over all levels in the set, which must
    /// strictly improve the objective to be kept.
    ///
    /// Returns whether any level changed. On failure every level is
    /// restored exactly. A set containing a frozen tank is rejected.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn optimize_partial_set(
        &self,
        tanks: &mut TankSet,
        target: &BallastTarget,
        indices: &[usize],
    ) -> bool {
        if indices.iter().any(|&index| tanks[index].is_frozen()) {
            return false;
        }
        match indices.len() {
            0 => false,
            1 => self.optimize_tank(tanks, target, indices[0]),
            2 => self.optimize_pair(tanks, target, indices[0], indices[1]),
            _ => self.optimize_many(tanks, target, indices),
        }
    }

    /// Two-tank case: four fixed-order collapse trials, then a joint fit.
    fn optimize_pair(
        &self,
        tanks: &mut TankSet,
        target: &BallastTarget,
        first: usize,
        second: usize,
    ) -> bool {
        let e0 = target.objective(tanks);
        let snapshot = tanks.levels();

        let trials = [
            (second, EMPTY_LEVEL, first),
            (first, FULL_LEVEL, second),
            (second, FULL_LEVEL, first),
            (first, EMPTY_LEVEL, second),
        ];
        for (driven, extreme, optimized) in trials {
            if tanks[driven].level() == extreme {
                continue;
            }
            tanks[driven].set_level(extreme);
            self.optimize_tank(tanks, target, optimized);
            if target.objective(tanks) <= e0 {
                self.trace_tank(tanks, driven, "pair collapse accepted on");
                return true;
            }
            tanks.restore_levels(&snapshot);
        }

        self.joint_fit(tanks, target, &[first, second], e0, &snapshot)
    }

    /// General case: collapse one tank to an extreme and recurse on the
    /// rest, empty trials before full trials, then a joint fit.
    fn optimize_many(
        &self,
        tanks: &mut TankSet,
        target: &BallastTarget,
        indices: &[usize],
    ) -> bool {
        let e0 = target.objective(tanks);
        let snapshot = tanks.levels();

        for extreme in [EMPTY_LEVEL, FULL_LEVEL] {
            for (position, &index) in indices.iter().enumerate() {
                if tanks[index].level() == extreme {
                    continue;
                }
                tanks[index].set_level(extreme);

                let rest: Vec<usize> = indices
                    .iter()
                    .enumerate()
                    .filter(|&(p, _)| p != position)
                    .map(|(_, &i)| i)
                    .collect();
                self.optimize_partial_set(tanks, target, &rest);

                if target.objective(tanks) <= e0 {
                    self.trace_tank(tanks, index, "subset collapse accepted on");
                    return true;
                }
                tanks.restore_levels(&snapshot);
            }
        }

        self.joint_fit(tanks, target, indices, e0, &snapshot)
    }

    /// Continuous joint fit with strict-improvement acceptance.
    fn joint_fit(
        &self,
        tanks: &mut TankSet,
        target: &BallastTarget,
        indices: &[usize],
        e0: f64,
        snapshot: &[f64],
    ) -> bool {
        let error = self.run_joint_minimization(tanks, target, indices);
        if error < e0 - self.config.resolved_min_error_reduction() {
            self.trace("joint fit accepted");
            true
        } else {
            tanks.restore_levels(snapshot);
            false
        }
    }

    /// Jointly minimizes the objective over the levels of `indices`, leaves
    /// the best point applied and returns the resulting objective value.
    /// The caller decides acceptance and rollback.
    fn run_joint_minimization(
        &self,
        tanks: &mut TankSet,
        target: &BallastTarget,
        indices: &[usize],
    ) -> f64 {
        let x0: Vec<f64> = indices.iter().map(|&index| tanks[index].level()).collect();
        let bounds = vec![(EMPTY_LEVEL, FULL_LEVEL); indices.len()];

        let minimum = minimize_vector_bounded(
            |levels| {
                for (&index, &level) in indices.iter().zip(levels) {
                    tanks[index].set_level(level);
                }
                target.objective(tanks)
            },
            &x0,
            &bounds,
            &self.vector_options,
        );
        if !minimum.converged {
            log::warn!(
                "joint minimization over {} tanks did not converge after {} iterations",
                indices.len(),
                minimum.iterations
            );
        }

        for (&index, &level) in indices.iter().zip(&minimum.x) {
            tanks[index].set_level(level);
        }
        target.objective(tanks)
    }

    fn trace(&self, message: &str) {
        if self.config.verbosity >= 2 {
            log::debug!("{message}");
        }
    }

    fn trace_tank(&self, tanks: &TankSet, index: usize, message: &str) {
        if self.config.verbosity >= 2 {
            log::debug!(
                "{} tank '{}' (level {:.3})",
                message,
                tanks[index].id(),
                tanks[index].level()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballast_core::Tank;
    use nalgebra::Point3;

    fn tank(id: &str, capacity: f64, x: f64) -> Tank {
        Tank::new(id, capacity, Point3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_optimize_tank_full_shortcut_is_exact() {
        let mut tanks: TankSet = vec![tank("T", 50.0, 0.0)].into_iter().collect();
        let target = BallastTarget::new(0.0, 0.0, 50.0);
        let solver = BallastSolver::default_config();

        assert!(solver.optimize_tank(&mut tanks, &target, 0));
        // The extreme trial assigns the level directly; a continuous search
        // could never land on the boundary exactly.
        assert_eq!(tanks[0].level(), 100.0);
    }

    #[test]
    fn test_optimize_tank_failure_restores_level() {
        let mut tanks: TankSet = vec![tank("T", 100.0, 0.0).with_level(50.0)]
            .into_iter()
            .collect();
        // Already exactly on target: nothing can improve.
        let target = BallastTarget::new(0.0, 0.0, 50.0);
        let solver = BallastSolver::default_config();

        assert!(!solver.optimize_tank(&mut tanks, &target, 0));
        assert_eq!(tanks[0].level(), 50.0);
    }

    #[test]
    fn test_optimize_tank_ignores_frozen() {
        let mut tanks: TankSet = vec![tank("T", 50.0, 0.0).with_frozen(true)]
            .into_iter()
            .collect();
        let target = BallastTarget::new(0.0, 0.0, 50.0);
        let solver = BallastSolver::default_config();

        assert!(!solver.optimize_tank(&mut tanks, &target, 0));
        assert_eq!(tanks[0].level(), 0.0);
    }

    #[test]
    fn test_optimize_tank_accepts_neutral_collapse_of_partial() {
        // Collapsing to full improves the objective by only 1e-5, below the
        // default minimum reduction of 4e-5. The tank was partial, so the
        // collapse is still accepted.
        let mut tanks: TankSet = vec![tank("T", 100.0, 0.0).with_level(99.99)]
            .into_iter()
            .collect();
        let target = BallastTarget::new(0.0, 0.0, 100.0);
        let solver = BallastSolver::default_config();

        assert!(solver.optimize_tank(&mut tanks, &target, 0));
        assert_eq!(tanks[0].level(), 100.0);
    }

    #[test]
    fn test_optimize_tank_rejects_sub_threshold_improvement() {
        // The continuous optimum (level 0.01) improves the objective by only
        // 1e-5, below the minimum reduction, and the tank was not partial:
        // the move is rejected and the level restored.
        let mut tanks: TankSet = vec![tank("T", 100.0, 0.0)].into_iter().collect();
        let target = BallastTarget::new(0.0, 0.0, 0.01);
        let solver = BallastSolver::default_config();

        assert!(!solver.optimize_tank(&mut tanks, &target, 0));
        assert_eq!(tanks[0].level(), 0.0);
    }

    #[test]
    fn test_optimize_partial_set_failure_restores_levels() {
        let mut tanks: TankSet = vec![
            tank("A", 100.0, 0.0).with_level(50.0),
            tank("B", 100.0, 10.0).with_level(50.0),
        ]
        .into_iter()
        .collect();
        // Exactly on target: every collapse and the joint fit must fail.
        let target = BallastTarget::new(5.0, 0.0, 100.0);
        let solver = BallastSolver::default_config();

        assert!(!solver.optimize_partial_set(&mut tanks, &target, &[0, 1]));
        assert_eq!(tanks.levels(), vec![50.0, 50.0]);
    }

    #[test]
    fn test_optimize_partial_set_rejects_frozen_member() {
        let mut tanks: TankSet = vec![
            tank("A", 100.0, 0.0).with_level(50.0),
            tank("B", 100.0, 10.0).with_level(50.0).with_frozen(true),
        ]
        .into_iter()
        .collect();
        let target = BallastTarget::new(0.0, 0.0, 150.0);
        let solver = BallastSolver::default_config();

        assert!(!solver.optimize_partial_set(&mut tanks, &target, &[0, 1]));
        assert_eq!(tanks.levels(), vec![50.0, 50.0]);
    }
}
