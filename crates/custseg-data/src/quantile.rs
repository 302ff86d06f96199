//! Empirical quantiles and equal-population binning.
//!
//! Bin edges are the linearly interpolated quantiles at `k / n_bins`.
//! Intervals are right-closed and the lowest edge belongs to the first bin,
//! so every value lands in exactly one of `n_bins` bins. Duplicate edges
//! are rejected instead of silently merging bins.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by quantile computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantileError {
    /// No values to compute quantiles from
    #[error("cannot compute quantiles of an empty sample")]
    Empty,

    /// NaN or infinite input value
    #[error("sample contains a non-finite value at position {index}")]
    NonFinite {
        /// Position of the first offending value
        index: usize,
    },

    /// Probability outside [0, 1]
    #[error("quantile probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    /// Fewer than two bins requested
    #[error("need at least 2 bins, got {0}")]
    InvalidBinCount(usize),

    /// Not enough distinct values for the requested bins
    #[error("bin edges are not unique: {edges:?}")]
    DuplicateEdges {
        /// Computed edges, lowest first
        edges: Vec<f64>,
    },
}

/// How to pick a quantile between two order statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantileMethod {
    /// Interpolate linearly between the neighbouring order statistics.
    #[default]
    Linear,
    /// Take the order statistic at the rounded position.
    Nearest,
}

/// Quantile `p` of `values`.
pub fn quantile(values: &[f64], p: f64, method: QuantileMethod) -> Result<f64, QuantileError> {
    let sorted = sorted_finite(values)?;
    quantile_sorted(&sorted, p, method)
}

/// Edges of `n_bins` equal-population bins, lowest first (`n_bins + 1` values).
pub fn quantile_edges(values: &[f64], n_bins: usize) -> Result<Vec<f64>, QuantileError> {
    if n_bins < 2 {
        return Err(QuantileError::InvalidBinCount(n_bins));
    }

    let sorted = sorted_finite(values)?;
    let edges = (0..=n_bins)
        .map(|k| quantile_sorted(&sorted, k as f64 / n_bins as f64, QuantileMethod::Linear))
        .collect::<Result<Vec<_>, _>>()?;

    if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(QuantileError::DuplicateEdges { edges });
    }

    Ok(edges)
}

/// Zero-based bin index of every value given strictly increasing `edges`.
pub fn assign_bins(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let last_bin = edges.len().saturating_sub(2);
    values
        .iter()
        .map(|&value| {
            let position = edges.partition_point(|&edge| edge < value);
            position.max(1).saturating_sub(1).min(last_bin)
        })
        .collect()
}

/// Zero-based equal-population bin index of every value.
pub fn quantile_bins(values: &[f64], n_bins: usize) -> Result<Vec<usize>, QuantileError> {
    let edges = quantile_edges(values, n_bins)?;
    Ok(assign_bins(values, &edges))
}

fn sorted_finite(values: &[f64]) -> Result<Vec<f64>, QuantileError> {
    if values.is_empty() {
        return Err(QuantileError::Empty);
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(QuantileError::NonFinite { index });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

fn quantile_sorted(sorted: &[f64], p: f64, method: QuantileMethod) -> Result<f64, QuantileError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(QuantileError::InvalidProbability(p));
    }

    let position = p * (sorted.len() - 1) as f64;
    let value = match method {
        QuantileMethod::Linear => {
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
        QuantileMethod::Nearest => sorted[position.round() as usize],
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_quantile_matches_interpolation() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_relative_eq!(quantile(&values, 0.5, QuantileMethod::Linear).unwrap(), 3.0);
        assert_relative_eq!(quantile(&values, 0.1, QuantileMethod::Linear).unwrap(), 1.4);
        assert_relative_eq!(quantile(&values, 0.99, QuantileMethod::Linear).unwrap(), 4.96);
    }

    #[test]
    fn test_nearest_quantile_is_an_order_statistic() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(quantile(&values, 0.01, QuantileMethod::Nearest).unwrap(), 10.0);
        assert_eq!(quantile(&values, 0.99, QuantileMethod::Nearest).unwrap(), 40.0);
        assert_eq!(quantile(&values, 0.5, QuantileMethod::Nearest).unwrap(), 30.0);
    }

    #[test]
    fn test_quantile_errors() {
        assert_eq!(quantile(&[], 0.5, QuantileMethod::Linear), Err(QuantileError::Empty));
        assert_eq!(
            quantile(&[1.0, f64::NAN], 0.5, QuantileMethod::Linear),
            Err(QuantileError::NonFinite { index: 1 })
        );
        assert_eq!(
            quantile(&[1.0], 1.5, QuantileMethod::Linear),
            Err(QuantileError::InvalidProbability(1.5))
        );
    }

    #[test]
    fn test_quintile_bins_equal_population() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let bins = quantile_bins(&values, 5).unwrap();

        for bin in 0..5 {
            assert_eq!(bins.iter().filter(|&&b| b == bin).count(), 4);
        }
        assert_eq!(bins[0], 0);
        assert_eq!(bins[19], 4);
    }

    #[test]
    fn test_lowest_value_in_first_bin_and_edges_right_closed() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let edges = quantile_edges(&values, 4).unwrap();
        assert_eq!(edges, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        // (1, 2] is bin 0 together with the lowest edge itself
        assert_eq!(assign_bins(&values, &edges), vec![0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_duplicate_edges_rejected() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 2.0];
        let result = quantile_edges(&values, 5);
        assert!(matches!(result, Err(QuantileError::DuplicateEdges { .. })));
    }

    #[test]
    fn test_bins_are_monotone() {
        let values = [9.5, 0.1, 3.3, 7.7, 2.2, 8.8, 4.4, 6.6, 5.5, 1.1];
        let bins = quantile_bins(&values, 5).unwrap();

        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] < values[j] {
                    assert!(bins[i] <= bins[j]);
                }
            }
        }
    }

    #[test]
    fn test_invalid_bin_count() {
        assert_eq!(quantile_edges(&[1.0, 2.0], 1), Err(QuantileError::InvalidBinCount(1)));
    }
}
