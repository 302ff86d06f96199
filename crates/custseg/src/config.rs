//! Pipeline configuration.
//!
//! Every field has a default, so a JSON file only needs the settings it
//! changes:
//!
//! ```json
//! {
//!   "anchor_date": "2021-06-01",
//!   "cltv": { "purchase_horizons_weeks": [4, 12, 24], "discount_rate": 0.02 }
//! }
//! ```

use crate::error::{Error, Result};
use chrono::NaiveDate;
use custseg_cltv::CltvConfig;
use custseg_data::OutlierConfig;
use custseg_data::anchor::DEFAULT_ANCHOR_OFFSET_DAYS;
use custseg_rfm::RfmConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a full analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Reference date for recency and tenure (default: derived from the data)
    pub anchor_date: Option<NaiveDate>,
    /// Days after the latest order used when `anchor_date` is unset (default: 2)
    pub anchor_offset_days: i64,
    /// Outlier fences for the CLTV inputs
    pub outliers: OutlierConfig,
    /// RFM scoring
    pub rfm: RfmConfig,
    /// CLTV models and projection
    pub cltv: CltvConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            anchor_date: None,
            anchor_offset_days: DEFAULT_ANCHOR_OFFSET_DAYS,
            outliers: OutlierConfig::default(),
            rfm: RfmConfig::default(),
            cltv: CltvConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        if self.anchor_offset_days < 0 {
            return Err(Error::Config(format!(
                "anchor_offset_days must be non-negative, got {}",
                self.anchor_offset_days
            )));
        }
        self.outliers.validate()?;
        self.rfm.validate()?;
        self.cltv.validate()?;
        Ok(())
    }
}
