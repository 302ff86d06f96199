//! Per-metric quantile scorers.
//!
//! Each metric is binned on its own empirical distribution. Scorers differ
//! in the column they read, the direction their bins map onto scores, and
//! (for frequency) the values that are actually binned.

pub mod frequency;
pub mod monetary;
pub mod recency;

pub use frequency::FrequencyScorer;
pub use monetary::MonetaryScorer;
pub use recency::RecencyScorer;

use crate::error::{Result, ScoringError};
use crate::score::{SCORE_LEVELS, Score, ScoreDirection};
use custseg_data::{assign_bins, f64_values, quantile_edges};
use polars::prelude::DataFrame;
use tracing::debug;

/// Turns one aggregated metric into 1-5 scores.
pub trait MetricScorer: std::fmt::Debug {
    /// Metric name used in logs and errors.
    fn name(&self) -> &str;

    /// Column of the aggregate table holding the metric.
    fn column(&self) -> &str;

    /// Mapping from bins to scores.
    fn direction(&self) -> ScoreDirection;

    /// Values to bin, one per row of `data`.
    fn binning_values(&self, data: &DataFrame) -> Result<Vec<f64>> {
        Ok(f64_values(data, self.column())?)
    }

    /// Score every row of `data` using `n_bins` equal-population bins.
    fn score(&self, data: &DataFrame, n_bins: usize) -> Result<Vec<Score>> {
        check_bin_count(n_bins)?;
        if data.height() == 0 {
            return Err(ScoringError::EmptyInput);
        }

        let values = self.binning_values(data)?;
        let edges = quantile_edges(&values, n_bins)
            .map_err(|e| ScoringError::from_quantile(self.name(), e))?;
        debug!(metric = self.name(), ?edges, "score bin edges");

        let direction = self.direction();
        assign_bins(&values, &edges)
            .into_iter()
            .map(|bin| Score::from_bin(bin, direction).ok_or(ScoringError::UnsupportedBinCount(n_bins)))
            .collect()
    }
}

/// Reject bin counts the scorers cannot map onto 1-5 scores.
pub fn check_bin_count(n_bins: usize) -> Result<()> {
    if n_bins < 2 {
        return Err(ScoringError::InvalidBinCount(n_bins));
    }
    if n_bins != SCORE_LEVELS {
        return Err(ScoringError::UnsupportedBinCount(n_bins));
    }
    Ok(())
}
