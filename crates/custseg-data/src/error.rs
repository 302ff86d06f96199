//! Error types for data operations.

use crate::quantile::QuantileError;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading and shaping transaction data.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error (missing or unreadable input file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error (schema mismatch, unparsable or empty required field)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Date field that is neither `YYYY-MM-DD` nor `YYYY-MM-DD HH:MM:SS`
    #[error("Invalid date '{value}': expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidDate {
        /// Raw field value
        value: String,
    },

    /// Input file had a header but no rows
    #[error("Dataset contains no transaction rows")]
    EmptyDataset,

    /// Required column contains nulls
    #[error("Column '{column}' contains {count} null values")]
    NullValues {
        /// Column name
        column: String,
        /// Number of nulls found
        count: usize,
    },

    /// NaN or infinite value in a numeric field
    #[error("Non-finite value in '{field}' for customer {customer_id}")]
    NonFinite {
        /// Customer the row belongs to
        customer_id: String,
        /// Field name
        field: &'static str,
    },

    /// Negative order count or monetary total
    #[error("Negative value {value} in '{field}' for customer {customer_id}")]
    NegativeValue {
        /// Customer the row belongs to
        customer_id: String,
        /// Field name
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// Quantile computation failed for a column
    #[error("Quantile error in column '{column}': {source}")]
    Quantile {
        /// Column name
        column: String,
        /// Underlying quantile error
        #[source]
        source: QuantileError,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
