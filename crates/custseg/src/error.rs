//! Error type spanning every stage of the analysis.

use custseg_cltv::CltvError;
use custseg_data::DataError;
use custseg_output::ExportError;
use custseg_rfm::ScoringError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from loading, scoring, modelling or exporting.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Loading or shaping input data failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// RFM scoring failed
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// CLTV modelling failed
    #[error(transparent)]
    Cltv(#[from] CltvError),

    /// Writing output failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
