//! Bounded derivative-free minimization.
//!
//! The solver never calls a numerical method directly; it goes through the
//! two entry points here so the method can be swapped without touching
//! solver logic:
//!
//! - [`minimize_scalar_bounded`]: golden-section search on an interval.
//! - [`minimize_vector_bounded`]: Nelder-Mead with every vertex clamped into
//!   a box.
//!
//! Non-convergence is not an error. Both functions report the best point
//! found together with a `converged` flag; the caller decides whether the
//! point is good enough.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inverse golden ratio, the interval reduction factor per iteration.
const INV_PHI: f64 = 0.618_033_988_749_895;

/// Options for [`minimize_scalar_bounded`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalarOptions {
    /// Stop once the bracket is narrower than this.
    pub tolerance: f64,
    /// Iteration cap; hitting it clears the `converged` flag.
    pub max_iterations: usize,
}

impl Default for ScalarOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_iterations: 100,
        }
    }
}

impl ScalarOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bracket tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(f64::EPSILON);
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations.max(1);
        self
    }
}

/// Result of a bounded scalar minimization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Minimum {
    /// Argument of the best point found.
    pub x: f64,
    /// Objective value at `x`.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the bracket shrank below tolerance within the budget.
    pub converged: bool,
}

/// Minimizes `f` over the closed interval `[bounds.0, bounds.1]` with
/// golden-section search.
///
/// The objective is assumed smooth enough for bracketing to make sense; a
/// multimodal objective yields a local minimum. The returned point always
/// lies inside the bounds.
pub fn minimize_scalar_bounded<F>(mut f: F, bounds: (f64, f64), options: &ScalarOptions) -> Minimum
where
    F: FnMut(f64) -> f64,
{
    let (mut lo, mut hi) = bounds;
    if hi < lo {
        std::mem::swap(&mut lo, &mut hi);
    }

    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    let mut iterations = 0;
    while iterations < options.max_iterations && (hi - lo) > options.tolerance {
        iterations += 1;
        if f1 <= f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = f(x2);
        }
    }

    let (x, value) = if f1 <= f2 { (x1, f1) } else { (x2, f2) };
    Minimum {
        x,
        value,
        iterations,
        converged: (hi - lo) <= options.tolerance,
    }
}

/// Options for [`minimize_vector_bounded`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VectorOptions {
    /// Simplex diameter below which the search is considered converged.
    pub tolerance: f64,
    /// Objective spread across the simplex below which the search is
    /// considered converged. Both criteria must hold.
    pub value_tolerance: f64,
    /// Iteration cap; hitting it clears the `converged` flag.
    pub max_iterations: usize,
    /// Initial simplex edge length, in the units of the variables.
    pub initial_step: f64,
}

impl Default for VectorOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            value_tolerance: 1e-8,
            max_iterations: 500,
            initial_step: 10.0,
        }
    }
}

impl VectorOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the simplex diameter tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(f64::EPSILON);
        self
    }

    /// Sets the objective spread tolerance.
    pub fn with_value_tolerance(mut self, tolerance: f64) -> Self {
        self.value_tolerance = tolerance.max(f64::EPSILON);
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations.max(1);
        self
    }

    /// Sets the initial simplex edge length.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step.max(f64::EPSILON);
        self
    }
}

/// Result of a bounded vector minimization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VectorMinimum {
    /// Argument of the best point found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether both convergence criteria held within the budget.
    pub converged: bool,
}

/// Minimizes `f` over the box given by `bounds` with Nelder-Mead, starting
/// from `x0`.
///
/// Every trial vertex is clamped into the box, so the returned point always
/// satisfies the bounds. A flat or underdetermined objective is handled
/// gracefully: the search shrinks onto the best vertex it can find and
/// reports `converged = false` if the simplex cannot collapse within the
/// budget.
///
/// # Panics
///
/// Panics if `bounds.len() != x0.len()`.
pub fn minimize_vector_bounded<F>(
    mut f: F,
    x0: &[f64],
    bounds: &[(f64, f64)],
    options: &VectorOptions,
) -> VectorMinimum
where
    F: FnMut(&[f64]) -> f64,
{
    assert_eq!(
        bounds.len(),
        x0.len(),
        "one (lo, hi) bound per variable is required"
    );

    let n = x0.len();
    if n == 0 {
        let value = f(&[]);
        return VectorMinimum {
            x: Vec::new(),
            value,
            iterations: 0,
            converged: true,
        };
    }

    let clamp = |x: &mut [f64]| {
        for (v, &(lo, hi)) in x.iter_mut().zip(bounds) {
            *v = v.clamp(lo, hi);
        }
    };

    // Reflection, expansion, contraction and shrink coefficients.
    const ALPHA: f64 = 1.0;
    const GAMMA: f64 = 2.0;
    const RHO: f64 = 0.5;
    const SIGMA: f64 = 0.5;

    let mut start = x0.to_vec();
    clamp(&mut start);

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    let start_value = f(&start);
    simplex.push((start.clone(), start_value));
    for i in 0..n {
        let (lo, hi) = bounds[i];
        let step = options.initial_step.min((hi - lo) / 2.0);
        let mut vertex = start.clone();
        if vertex[i] + step <= hi {
            vertex[i] += step;
        } else {
            vertex[i] -= step;
        }
        clamp(&mut vertex);
        let value = f(&vertex);
        simplex.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;
    while iterations < options.max_iterations {
        iterations += 1;
        sort_simplex(&mut simplex);

        if simplex_diameter(&simplex) <= options.tolerance
            && value_spread(&simplex) <= options.value_tolerance
        {
            converged = true;
            break;
        }

        // Centroid of all vertices but the worst.
        let mut centroid = vec![0.0; n];
        for (vertex, _) in &simplex[..n] {
            for k in 0..n {
                centroid[k] += vertex[k];
            }
        }
        for c in centroid.iter_mut() {
            *c /= n as f64;
        }

        let worst = simplex[n].clone();
        let best_value = simplex[0].1;
        let second_worst_value = simplex[n - 1].1;

        let mut reflected: Vec<f64> = (0..n)
            .map(|k| centroid[k] + ALPHA * (centroid[k] - worst.0[k]))
            .collect();
        clamp(&mut reflected);
        let reflected_value = f(&reflected);

        if reflected_value < best_value {
            let mut expanded: Vec<f64> = (0..n)
                .map(|k| centroid[k] + GAMMA * (reflected[k] - centroid[k]))
                .collect();
            clamp(&mut expanded);
            let expanded_value = f(&expanded);
            simplex[n] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
        } else if reflected_value < second_worst_value {
            simplex[n] = (reflected, reflected_value);
        } else {
            let (towards, towards_value) = if reflected_value < worst.1 {
                (&reflected, reflected_value)
            } else {
                (&worst.0, worst.1)
            };
            let mut contracted: Vec<f64> = (0..n)
                .map(|k| centroid[k] + RHO * (towards[k] - centroid[k]))
                .collect();
            clamp(&mut contracted);
            let contracted_value = f(&contracted);
            if contracted_value < towards_value {
                simplex[n] = (contracted, contracted_value);
            } else {
                // Shrink every vertex towards the best one.
                let best = simplex[0].0.clone();
                for entry in simplex.iter_mut().skip(1) {
                    for k in 0..n {
                        entry.0[k] = best[k] + SIGMA * (entry.0[k] - best[k]);
                    }
                    entry.1 = f(&entry.0);
                }
            }
        }
    }

    sort_simplex(&mut simplex);
    let (x, value) = simplex.swap_remove(0);
    VectorMinimum {
        x,
        value,
        iterations,
        converged,
    }
}

fn sort_simplex(simplex: &mut [(Vec<f64>, f64)]) {
    simplex.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
}

/// Largest coordinate distance from any vertex to the best vertex.
fn simplex_diameter(simplex: &[(Vec<f64>, f64)]) -> f64 {
    let best = &simplex[0].0;
    simplex[1..]
        .iter()
        .flat_map(|(vertex, _)| vertex.iter().zip(best).map(|(v, b)| (v - b).abs()))
        .fold(0.0, f64::max)
}

fn value_spread(simplex: &[(Vec<f64>, f64)]) -> f64 {
    (simplex[simplex.len() - 1].1 - simplex[0].1).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_quadratic_interior_minimum() {
        let minimum =
            minimize_scalar_bounded(|x| (x - 3.0) * (x - 3.0), (0.0, 10.0), &ScalarOptions::new());
        assert!(minimum.converged);
        assert_relative_eq!(minimum.x, 3.0, epsilon = 1e-4);
        assert!(minimum.value < 1e-8);
    }

    #[test]
    fn test_scalar_minimum_at_lower_bound() {
        let minimum = minimize_scalar_bounded(|x| x * x, (2.0, 5.0), &ScalarOptions::new());
        assert!(minimum.converged);
        assert_relative_eq!(minimum.x, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_scalar_respects_bounds() {
        let minimum = minimize_scalar_bounded(|x| -x, (0.0, 100.0), &ScalarOptions::new());
        assert!(minimum.x <= 100.0);
        assert!(minimum.x >= 0.0);
        // Unconstrained minimum is at +infinity; the search ends at the top.
        assert_relative_eq!(minimum.x, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_scalar_reports_non_convergence() {
        let options = ScalarOptions::new()
            .with_tolerance(1e-12)
            .with_max_iterations(3);
        let minimum = minimize_scalar_bounded(|x| (x - 3.0) * (x - 3.0), (0.0, 10.0), &options);
        assert!(!minimum.converged);
        assert_eq!(minimum.iterations, 3);
    }

    #[test]
    fn test_scalar_swapped_bounds() {
        let minimum =
            minimize_scalar_bounded(|x| (x - 3.0) * (x - 3.0), (10.0, 0.0), &ScalarOptions::new());
        assert_relative_eq!(minimum.x, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_vector_quadratic_bowl() {
        let minimum = minimize_vector_bounded(
            |x| (x[0] - 1.0).powi(2) + (x[1] - 2.0).powi(2),
            &[8.0, 8.0],
            &[(-10.0, 10.0), (-10.0, 10.0)],
            &VectorOptions::new(),
        );
        assert!(minimum.converged);
        assert_relative_eq!(minimum.x[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(minimum.x[1], 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_vector_minimum_clamped_to_box() {
        // Unconstrained minimum at (-5, -5) lies outside the box.
        let minimum = minimize_vector_bounded(
            |x| (x[0] + 5.0).powi(2) + (x[1] + 5.0).powi(2),
            &[5.0, 5.0],
            &[(0.0, 10.0), (0.0, 10.0)],
            &VectorOptions::new(),
        );
        assert!(minimum.x[0] >= 0.0 && minimum.x[1] >= 0.0);
        assert_relative_eq!(minimum.x[0], 0.0, epsilon = 1e-2);
        assert_relative_eq!(minimum.x[1], 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_vector_flat_objective() {
        let minimum = minimize_vector_bounded(
            |_| 1.0,
            &[50.0, 50.0, 50.0],
            &[(0.0, 100.0); 3],
            &VectorOptions::new(),
        );
        // Nothing to improve; the search must still terminate at a valid point.
        assert_relative_eq!(minimum.value, 1.0);
        assert!(minimum.x.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn test_vector_curved_valley() {
        // The kind of objective the solver produces: a curved equality
        // manifold with a single feasible optimum at (50, 50).
        let minimum = minimize_vector_bounded(
            |x| {
                let weight = x[0] + x[1];
                let cog = if weight > 0.0 { 10.0 * x[1] / weight } else { 0.0 };
                (cog - 5.0).powi(2) + 0.1 * (weight - 100.0).powi(2)
            },
            &[95.0, 5.0],
            &[(0.0, 100.0), (0.0, 100.0)],
            &VectorOptions::new(),
        );
        assert!(minimum.value < 1e-4, "value = {}", minimum.value);
        assert_relative_eq!(minimum.x[0], 50.0, epsilon = 0.5);
        assert_relative_eq!(minimum.x[1], 50.0, epsilon = 0.5);
    }

    #[test]
    fn test_vector_empty_input() {
        let minimum = minimize_vector_bounded(|_| 42.0, &[], &[], &VectorOptions::new());
        assert!(minimum.converged);
        assert_relative_eq!(minimum.value, 42.0);
    }

    #[test]
    fn test_vector_budget_exhaustion_reported() {
        let options = VectorOptions::new().with_max_iterations(2);
        let minimum =
            minimize_vector_bounded(|x| (x[0] - 1.0).powi(2), &[9.0], &[(0.0, 10.0)], &options);
        assert!(!minimum.converged);
        assert_eq!(minimum.iterations, 2);
    }
}
