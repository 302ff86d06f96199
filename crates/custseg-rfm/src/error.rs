//! Error types for RFM scoring.

use crate::segment::UnknownSegment;
use custseg_data::{DataError, QuantileError};
use thiserror::Error;

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Errors that can occur while scoring and segmenting customers.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// No customers to score
    #[error("Cannot score an empty customer table")]
    EmptyInput,

    /// Too few distinct values to form the requested bins
    #[error("Duplicate bin edges for {metric}: {edges:?}")]
    DuplicateBinEdges {
        /// Metric being binned
        metric: String,
        /// Computed edges, lowest first
        edges: Vec<f64>,
    },

    /// NaN or infinite metric value
    #[error("Non-finite {metric} value at row {index}")]
    NonFinite {
        /// Metric being binned
        metric: String,
        /// Row of the first offending value
        index: usize,
    },

    /// Bin count below two
    #[error("Invalid bin count: {0}")]
    InvalidBinCount(usize),

    /// Bin count the segment map cannot interpret
    #[error("Segmentation needs exactly 5 score bins, got {0}")]
    UnsupportedBinCount(usize),

    /// Any other quantile failure
    #[error("Quantile error for {metric}: {source}")]
    Quantile {
        /// Metric being binned
        metric: String,
        /// Underlying error
        #[source]
        source: QuantileError,
    },

    /// Segment label that names no segment
    #[error("Invalid segment label: {0}")]
    UnknownSegment(#[from] UnknownSegment),

    /// Input table error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl ScoringError {
    /// Attach the metric name to a quantile failure.
    pub fn from_quantile(metric: &str, error: QuantileError) -> Self {
        match error {
            QuantileError::Empty => Self::EmptyInput,
            QuantileError::NonFinite { index } => Self::NonFinite {
                metric: metric.to_string(),
                index,
            },
            QuantileError::InvalidBinCount(n) => Self::InvalidBinCount(n),
            QuantileError::DuplicateEdges { edges } => Self::DuplicateBinEdges {
                metric: metric.to_string(),
                edges,
            },
            source @ QuantileError::InvalidProbability(_) => Self::Quantile {
                metric: metric.to_string(),
                source,
            },
        }
    }
}
