//! Outlier suppression by quantile fencing.
//!
//! The fence is the usual IQR rule with the 1st and 99th percentiles standing
//! in for the quartiles:
//!
//! ```text
//! low  = q_low  - k * (q_high - q_low)
//! high = q_high + k * (q_high - q_low)
//! ```
//!
//! Values outside the fence are clamped to it, never dropped. The percentiles
//! are taken as nearest-rank order statistics: clamping only moves values
//! that lie strictly beyond them, so the percentiles and therefore the fence
//! are unchanged on a second pass and capping is idempotent.

use crate::error::{DataError, Result};
use crate::frame::f64_values;
use crate::quantile::{QuantileError, QuantileMethod, quantile};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the outlier fence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// Lower percentile used as the first-quartile proxy (default: 0.01)
    pub low_pct: f64,
    /// Upper percentile used as the third-quartile proxy (default: 0.99)
    pub high_pct: f64,
    /// IQR multiplier (default: 1.5)
    pub iqr_multiplier: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            low_pct: 0.01,
            high_pct: 0.99,
            iqr_multiplier: 1.5,
        }
    }
}

impl OutlierConfig {
    /// Check percentile bounds and multiplier.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.low_pct)
            || !(0.0..=1.0).contains(&self.high_pct)
            || self.low_pct >= self.high_pct
        {
            return Err(DataError::InvalidConfig(format!(
                "outlier percentiles must satisfy 0 <= low < high <= 1, got low={} high={}",
                self.low_pct, self.high_pct
            )));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(DataError::InvalidConfig(format!(
                "IQR multiplier must be finite and non-negative, got {}",
                self.iqr_multiplier
            )));
        }
        Ok(())
    }
}

/// Acceptable value range for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fence {
    /// Lower bound
    pub low: f64,
    /// Upper bound
    pub high: f64,
}

impl Fence {
    /// Compute the fence of a column.
    pub fn from_values(values: &[f64], config: &OutlierConfig) -> std::result::Result<Self, QuantileError> {
        let q_low = quantile(values, config.low_pct, QuantileMethod::Nearest)?;
        let q_high = quantile(values, config.high_pct, QuantileMethod::Nearest)?;
        let iqr = q_high - q_low;

        Ok(Self {
            low: q_low - config.iqr_multiplier * iqr,
            high: q_high + config.iqr_multiplier * iqr,
        })
    }

    /// Clamp a value into the fence.
    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.low {
            self.low
        } else if value > self.high {
            self.high
        } else {
            value
        }
    }

    /// Whether a value lies inside the fence.
    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

/// Caps numeric columns at their quantile fences.
#[derive(Debug, Clone, Default)]
pub struct OutlierSuppressor {
    config: OutlierConfig,
}

impl OutlierSuppressor {
    /// Create a suppressor with the given fence configuration.
    pub const fn new(config: OutlierConfig) -> Self {
        Self { config }
    }

    /// Fence configuration.
    pub const fn config(&self) -> &OutlierConfig {
        &self.config
    }

    /// Clamp every value of a column into its fence.
    pub fn cap(&self, values: &[f64]) -> std::result::Result<Vec<f64>, QuantileError> {
        let fence = Fence::from_values(values, &self.config)?;
        Ok(values.iter().map(|&v| fence.clamp(v)).collect())
    }

    /// Return a copy of `frame` with each named column capped.
    pub fn cap_frame(&self, frame: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        let mut capped = frame.clone();

        for &name in columns {
            let values = f64_values(frame, name)?;
            let fence = Fence::from_values(&values, &self.config).map_err(|source| {
                DataError::Quantile {
                    column: name.to_string(),
                    source,
                }
            })?;

            let clamped = values.iter().filter(|&&v| !fence.contains(v)).count();
            debug!(
                column = name,
                low = fence.low,
                high = fence.high,
                clamped,
                "capped column"
            );

            let values: Vec<f64> = values.into_iter().map(|v| fence.clamp(v)).collect();
            let column: Column = Series::new(name.into(), values).into();
            capped.with_column(column)?;
        }

        Ok(capped)
    }
}
