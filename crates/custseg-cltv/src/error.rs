//! Error types for CLTV modelling.

use custseg_data::{DataError, QuantileError};
use thiserror::Error;

/// Result type for CLTV operations.
pub type Result<T> = std::result::Result<T, CltvError>;

/// Errors that can occur while fitting models and projecting lifetime value.
#[derive(Debug, Error)]
pub enum CltvError {
    /// Nobody passed the repeat-purchase filter
    #[error("No customers with more than {min_orders} orders")]
    NoEligibleCustomers {
        /// Order threshold in effect
        min_orders: f64,
    },

    /// Too few customers to fit a model
    #[error("Insufficient customers: need at least {required}, got {actual}")]
    InsufficientCustomers {
        /// Required number of customers
        required: usize,
        /// Actual number of customers
        actual: usize,
    },

    /// Average order value must be strictly positive
    #[error("Non-positive average order value {value} for customer {customer_id}")]
    NonPositiveMonetary {
        /// Customer identifier
        customer_id: String,
        /// Offending value
        value: f64,
    },

    /// NaN or infinite input or prediction
    #[error("Non-finite {field} for customer {customer_id}")]
    NonFinite {
        /// Customer identifier
        customer_id: String,
        /// Field name
        field: &'static str,
    },

    /// Fitted parameters outside the region where predictions are defined
    #[error("Degenerate {model} fit: {reason}")]
    DegenerateModel {
        /// Model name
        model: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Input arrays of different lengths
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Tier binning failed
    #[error("Tier binning failed: {0}")]
    Binning(#[from] QuantileError),

    /// Input table error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
