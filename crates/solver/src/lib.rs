//! # Ballast Solver
//!
//! Computes ballast tank fill levels that put a vessel's combined center of
//! gravity and total ballast weight on target.
//!
//! The solver mixes continuous and combinatorial search: single tanks are
//! fitted with a bounded scalar minimization, groups of partial tanks are
//! first attacked with collapse-to-extreme moves (a tank driven to exactly
//! empty or full) and only then with a bounded joint fit. Collapsed
//! distributions are preferred over equally good continuous ones because
//! they are simpler to realize and more robust to disturbance.
//!
//! ## Components
//!
//! - [`BallastSolver`] - the layered solver
//! - [`SolverConfig`] - tolerance, minimum accepted improvement, iteration
//!   cap, verbosity
//! - [`SolveReport`] - iterations, final error and error history of a
//!   successful solve
//!
//! The tank model and the target live in [`ballast_core`] and are
//! re-exported here for convenience.
//!
//! ## Example
//!
//! ```rust
//! use ballast_solver::{BallastSolver, BallastTarget, SolverConfig, Tank, TankSet};
//! use nalgebra::Point3;
//!
//! let mut tanks: TankSet = vec![
//!     Tank::new("FWD", 100.0, Point3::new(0.0, 0.0, 0.0)),
//!     Tank::new("AFT", 100.0, Point3::new(10.0, 0.0, 0.0)),
//! ]
//! .into_iter()
//! .collect();
//!
//! let solver = BallastSolver::new(SolverConfig::default());
//! let report = solver
//!     .solve(&mut tanks, &BallastTarget::new(5.0, 0.0, 100.0))
//!     .expect("reachable target");
//! assert!(report.final_error < 1e-3);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod config;
pub mod report;
pub mod solver;

// Re-exports
pub use config::SolverConfig;
pub use report::SolveReport;
pub use solver::BallastSolver;

pub use ballast_core::{BallastTarget, Error, Result, Tank, TankSet};
