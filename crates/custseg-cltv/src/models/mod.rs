//! Probabilistic customer models
//!
//! Both models are fitted by minimizing the mean negative log-likelihood plus
//! an L2 penalty on the parameters:
//!
//! ```text
//! objective(θ) = -mean(ll_i(θ)) + penalizer * Σ θ_k²
//! ```
//!
//! The search runs over log-parameters so every parameter stays positive.

pub mod bgnbd;
pub mod gamma_gamma;

pub use bgnbd::{BetaGeoFitter, BetaGeoModel, BetaGeoParams};
pub use gamma_gamma::{GammaGammaFitter, GammaGammaModel, GammaGammaParams, LifetimeHorizon};

use crate::error::{CltvError, Result};
use crate::optimize::NelderMeadConfig;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Starting value of every log-parameter.
pub const INITIAL_LOG_PARAM: f64 = 0.1;

/// Settings shared by the model fitters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// L2 penalty coefficient (default: 0.001)
    pub penalizer: f64,
    /// Optimizer settings
    pub optimizer: NelderMeadConfig,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            penalizer: 0.001,
            optimizer: NelderMeadConfig::default(),
        }
    }
}

/// Predicts purchase counts from a customer's history.
pub trait PurchaseModel {
    /// Expected purchases in the next `t` weeks for a customer with
    /// `frequency` repeat purchases, last purchase `recency` weeks after the
    /// first and `tenure` weeks since the first.
    fn expected_purchases(&self, t: f64, frequency: f64, recency: f64, tenure: f64) -> f64;
}

/// Predicts per-order spend from a customer's history.
pub trait SpendModel {
    /// Expected average order value of a customer with `frequency` orders
    /// averaging `monetary_avg`.
    fn expected_average_value(&self, frequency: f64, monetary_avg: f64) -> f64;
}

/// Check that every input column has `expected` finite entries.
pub(crate) fn check_inputs(expected: usize, columns: &[(&str, &Array1<f64>)]) -> Result<()> {
    for (name, column) in columns {
        if column.len() != expected {
            return Err(CltvError::DimensionMismatch {
                expected,
                actual: column.len(),
            });
        }
        if let Some(row) = column.iter().position(|v| !v.is_finite()) {
            return Err(CltvError::InvalidParameter(format!(
                "non-finite {name} at row {row}"
            )));
        }
    }
    Ok(())
}
