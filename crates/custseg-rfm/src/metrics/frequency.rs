//! Frequency scorer
//!
//! Order counts are heavily tied (most customers have a handful of orders),
//! which would collapse quantile edges. Counts are therefore replaced by their
//! ordinal rank before binning, ties broken by row order.

use super::MetricScorer;
use crate::error::Result;
use crate::score::ScoreDirection;
use custseg_data::columns::FREQUENCY;
use custseg_data::f64_values;
use polars::prelude::*;

const FREQUENCY_RANK: &str = "frequency_rank";

/// Scores order counts via their ordinal rank
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyScorer;

impl MetricScorer for FrequencyScorer {
    fn name(&self) -> &str {
        "frequency"
    }

    fn column(&self) -> &str {
        FREQUENCY
    }

    fn direction(&self) -> ScoreDirection {
        ScoreDirection::HigherIsBetter
    }

    fn binning_values(&self, data: &DataFrame) -> Result<Vec<f64>> {
        let ranked = data
            .clone()
            .lazy()
            .select([col(FREQUENCY)
                .rank(
                    RankOptions {
                        method: RankMethod::Ordinal,
                        descending: false,
                    },
                    None,
                )
                .alias(FREQUENCY_RANK)])
            .collect()?;

        Ok(f64_values(&ranked, FREQUENCY_RANK)?)
    }
}
