//! Nelder-Mead simplex minimization
//!
//! Derivative-free minimizer used for the likelihood fits. Standard
//! coefficients: reflection 1, expansion 2, contraction 0.5, shrink 0.5.
//! The initial simplex perturbs each coordinate of the start point by 5%
//! (0.00025 for zero coordinates).
//!
//! Iteration stops once both the simplex diameter (max coordinate distance
//! from the best vertex) and the spread of objective values fall below
//! `tolerance`. NaN objective values are treated as +inf so the search
//! moves away from undefined regions.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;
const NONZERO_DELTA: f64 = 0.05;
const ZERO_DELTA: f64 = 0.000_25;

/// Nelder-Mead configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations (default: 5000)
    pub max_iterations: usize,
    /// Absolute tolerance on both parameters and objective (default: 1e-10)
    pub tolerance: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            tolerance: 1e-10,
        }
    }
}

/// Outcome of a minimization.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Best point found
    pub point: Array1<f64>,
    /// Objective at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was reached before the iteration limit
    pub converged: bool,
}

/// Nelder-Mead minimizer
#[derive(Debug, Clone, Default)]
pub struct NelderMead {
    config: NelderMeadConfig,
}

impl NelderMead {
    /// Create a minimizer.
    pub const fn new(config: NelderMeadConfig) -> Self {
        Self { config }
    }

    /// Minimizer configuration.
    pub const fn config(&self) -> &NelderMeadConfig {
        &self.config
    }

    /// Minimize `objective` starting from `start`.
    ///
    /// Never fails: when the iteration limit is hit the best vertex so far is
    /// returned with `converged == false`.
    pub fn minimize<F>(&self, objective: F, start: &Array1<f64>) -> Minimum
    where
        F: Fn(&Array1<f64>) -> f64,
    {
        let evaluate = |x: &Array1<f64>| {
            let value = objective(x);
            if value.is_nan() { f64::INFINITY } else { value }
        };

        let n = start.len();
        let mut simplex: Vec<Array1<f64>> = Vec::with_capacity(n + 1);
        simplex.push(start.clone());
        for i in 0..n {
            let mut vertex = start.clone();
            vertex[i] = if vertex[i] == 0.0 {
                ZERO_DELTA
            } else {
                (1.0 + NONZERO_DELTA) * vertex[i]
            };
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(&evaluate).collect();

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            sort_simplex(&mut simplex, &mut values);

            if self.has_converged(&simplex, &values) {
                converged = true;
                break;
            }
            iterations += 1;

            let worst = n;
            let centroid = simplex[..n]
                .iter()
                .fold(Array1::<f64>::zeros(n), |acc, v| acc + v)
                / n as f64;

            let reflected = &centroid + &((&centroid - &simplex[worst]) * REFLECTION);
            let f_reflected = evaluate(&reflected);

            if f_reflected < values[0] {
                let expanded = &centroid + &((&reflected - &centroid) * EXPANSION);
                let f_expanded = evaluate(&expanded);
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
                continue;
            }

            if f_reflected < values[n - 1] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
                continue;
            }

            // outside contraction if the reflection improved on the worst vertex
            let outside = f_reflected < values[worst];
            let contracted = if outside {
                &centroid + &((&reflected - &centroid) * CONTRACTION)
            } else {
                &centroid + &((&simplex[worst] - &centroid) * CONTRACTION)
            };
            let f_contracted = evaluate(&contracted);

            let accept = if outside {
                f_contracted <= f_reflected
            } else {
                f_contracted < values[worst]
            };

            if accept {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
                continue;
            }

            let best = simplex[0].clone();
            for i in 1..=n {
                simplex[i] = &best + &((&simplex[i] - &best) * SHRINK);
                values[i] = evaluate(&simplex[i]);
            }
        }

        sort_simplex(&mut simplex, &mut values);
        Minimum {
            point: simplex.swap_remove(0),
            value: values[0],
            iterations,
            converged,
        }
    }

    fn has_converged(&self, simplex: &[Array1<f64>], values: &[f64]) -> bool {
        let tol = self.config.tolerance;
        let best = &simplex[0];

        let diameter = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(best.iter()).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        let spread = values[1..]
            .iter()
            .map(|v| (v - values[0]).abs())
            .fold(0.0_f64, f64::max);

        diameter <= tol && spread <= tol
    }
}

/// Order vertices by objective value, best first.
fn sort_simplex(simplex: &mut Vec<Array1<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let sorted_simplex: Vec<Array1<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
    let sorted_values: Vec<f64> = order.iter().map(|&i| values[i]).collect();
    *simplex = sorted_simplex;
    *values = sorted_values;
}
