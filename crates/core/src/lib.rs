//! # Ballast Core
//!
//! Data model and shared numerics for the ballast distribution solver.
//!
//! This crate provides the types the solver crate operates on:
//!
//! - **Tank model**: [`Tank`], [`TankSet`] - adjustable ballast tanks with
//!   fixed positions and aggregate read-outs (total weight, center of
//!   gravity)
//! - **Target**: [`BallastTarget`] - the desired center of gravity and total
//!   weight, with the weighted-squared-error objective
//! - **Minimizers**: [`minimize_scalar_bounded`], [`minimize_vector_bounded`]
//!   - bounded derivative-free minimization behind a small seam
//! - **Errors**: [`Error`], [`Result`]
//!
//! ## Example
//!
//! ```rust
//! use ballast_core::{BallastTarget, Tank, TankSet};
//! use nalgebra::Point3;
//!
//! let tanks: TankSet = vec![
//!     Tank::new("PS", 100.0, Point3::new(0.0, -4.0, 0.0)).with_level(50.0),
//!     Tank::new("SB", 100.0, Point3::new(0.0, 4.0, 0.0)).with_level(50.0),
//! ]
//! .into_iter()
//! .collect();
//!
//! let target = BallastTarget::new(0.0, 0.0, 100.0);
//! assert!(target.objective(&tanks) < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod minimize;
pub mod tank;
pub mod target;

// Re-exports
pub use error::{Error, Result};
pub use minimize::{
    minimize_scalar_bounded, minimize_vector_bounded, Minimum, ScalarOptions, VectorMinimum,
    VectorOptions,
};
pub use tank::{Tank, TankSet, EMPTY_LEVEL, FULL_LEVEL};
pub use target::{BallastTarget, WEIGHT_TERM_FACTOR};
