//! CLTV quartile tiers.

use custseg_data::{QuantileError, quantile_bins};
use serde::{Deserialize, Serialize};
use std::fmt;

const TIER_COUNT: usize = 4;

/// Quartile of the CLTV distribution, D lowest to A highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Bottom quartile
    D,
    /// Second quartile
    C,
    /// Third quartile
    B,
    /// Top quartile
    A,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Self; TIER_COUNT] = [Self::D, Self::C, Self::B, Self::A];

    /// Tier label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::D => "D",
            Self::C => "C",
            Self::B => "B",
            Self::A => "A",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split values into equal-population quartile tiers.
pub fn assign_tiers(values: &[f64]) -> Result<Vec<Tier>, QuantileError> {
    let bins = quantile_bins(values, TIER_COUNT)?;
    Ok(bins
        .into_iter()
        .map(|bin| Tier::ALL[bin.min(TIER_COUNT - 1)])
        .collect())
}
