//! RFM scoring of a customer aggregate table.

use crate::code::RfmCode;
use crate::error::{Result, ScoringError};
use crate::metrics::{FrequencyScorer, MetricScorer, MonetaryScorer, RecencyScorer, check_bin_count};
use crate::score::Score;
use crate::segment::Segment;
use custseg_data::columns::{FREQUENCY, MASTER_ID, MONETARY, RECENCY};
use custseg_data::{f64_values, i64_values, str_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Score column names used by [`RfmTable::to_frame`].
pub mod columns {
    /// Recency score column
    pub const RECENCY_SCORE: &str = "recency_score";
    /// Frequency score column
    pub const FREQUENCY_SCORE: &str = "frequency_score";
    /// Monetary score column
    pub const MONETARY_SCORE: &str = "monetary_score";
    /// RFM code column
    pub const RFM_CODE: &str = "rfm_code";
    /// Segment label column
    pub const SEGMENT: &str = "segment";
}

/// Configuration for RFM scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RfmConfig {
    /// Number of quantile bins per metric (default: 5, the only count the
    /// segment map supports)
    pub n_score_bins: usize,
}

impl Default for RfmConfig {
    fn default() -> Self {
        Self { n_score_bins: 5 }
    }
}

impl RfmConfig {
    /// Check the bin count.
    pub fn validate(&self) -> Result<()> {
        check_bin_count(self.n_score_bins)
    }
}

/// Scores and segment of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmRecord {
    /// Customer identifier
    pub customer_id: String,
    /// Days since the last order
    pub recency: i64,
    /// Order count
    pub frequency: i64,
    /// Total spend
    pub monetary: f64,
    /// Recency score
    pub recency_score: Score,
    /// Frequency score
    pub frequency_score: Score,
    /// Monetary score
    pub monetary_score: Score,
    /// Recency and frequency digits
    pub rfm_code: RfmCode,
    /// Segment derived from the code
    pub segment: Segment,
}

/// Scored customers in customer-id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfmTable {
    records: Vec<RfmRecord>,
}

impl RfmTable {
    /// Wrap scored records.
    pub const fn new(records: Vec<RfmRecord>) -> Self {
        Self { records }
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records.
    pub fn records(&self) -> &[RfmRecord] {
        &self.records
    }

    /// Iterate over records.
    pub fn iter(&self) -> impl Iterator<Item = &RfmRecord> {
        self.records.iter()
    }

    /// Record of one customer.
    pub fn get(&self, customer_id: &str) -> Option<&RfmRecord> {
        self.records
            .binary_search_by(|r| r.customer_id.as_str().cmp(customer_id))
            .ok()
            .map(|i| &self.records[i])
    }

    /// Segment lookup by customer id.
    pub fn segments(&self) -> HashMap<&str, Segment> {
        self.records
            .iter()
            .map(|r| (r.customer_id.as_str(), r.segment))
            .collect()
    }

    /// Customers per segment.
    pub fn segment_counts(&self) -> HashMap<Segment, usize> {
        let mut counts = HashMap::new();
        for record in &self.records {
            *counts.entry(record.segment).or_insert(0) += 1;
        }
        counts
    }

    /// Table as a polars frame.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let ids: Vec<&str> = self.records.iter().map(|r| r.customer_id.as_str()).collect();
        let recency: Vec<i64> = self.records.iter().map(|r| r.recency).collect();
        let frequency: Vec<i64> = self.records.iter().map(|r| r.frequency).collect();
        let monetary: Vec<f64> = self.records.iter().map(|r| r.monetary).collect();
        let score = |f: fn(&RfmRecord) -> Score| -> Vec<u32> {
            self.records.iter().map(|r| u32::from(f(r).value())).collect()
        };
        let codes: Vec<String> = self.records.iter().map(|r| r.rfm_code.to_string()).collect();
        let segments: Vec<&str> = self.records.iter().map(|r| r.segment.as_str()).collect();

        let df = DataFrame::new(vec![
            Series::new(MASTER_ID.into(), ids).into(),
            Series::new(RECENCY.into(), recency).into(),
            Series::new(FREQUENCY.into(), frequency).into(),
            Series::new(MONETARY.into(), monetary).into(),
            Series::new(columns::RECENCY_SCORE.into(), score(|r| r.recency_score)).into(),
            Series::new(columns::FREQUENCY_SCORE.into(), score(|r| r.frequency_score)).into(),
            Series::new(columns::MONETARY_SCORE.into(), score(|r| r.monetary_score)).into(),
            Series::new(columns::RFM_CODE.into(), codes).into(),
            Series::new(columns::SEGMENT.into(), segments).into(),
        ])?;

        Ok(df)
    }
}

impl<'a> IntoIterator for &'a RfmTable {
    type Item = &'a RfmRecord;
    type IntoIter = std::slice::Iter<'a, RfmRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Scores and segments customers from their RFM aggregate.
#[derive(Debug, Clone, Default)]
pub struct RfmScorer {
    config: RfmConfig,
}

impl RfmScorer {
    /// Create a scorer.
    pub const fn new(config: RfmConfig) -> Self {
        Self { config }
    }

    /// Scoring configuration.
    pub const fn config(&self) -> &RfmConfig {
        &self.config
    }

    /// Score an aggregate with `master_id`, `recency`, `frequency` and
    /// `monetary` columns.
    pub fn score(&self, aggregate: &DataFrame) -> Result<RfmTable> {
        self.config.validate()?;
        if aggregate.height() == 0 {
            return Err(ScoringError::EmptyInput);
        }

        // scorers rely on id order for tie breaking
        let aggregate = aggregate.sort([MASTER_ID], SortMultipleOptions::default())?;
        let n_bins = self.config.n_score_bins;

        let recency_scores = RecencyScorer.score(&aggregate, n_bins)?;
        let frequency_scores = FrequencyScorer.score(&aggregate, n_bins)?;
        let monetary_scores = MonetaryScorer.score(&aggregate, n_bins)?;

        let ids = str_values(&aggregate, MASTER_ID)?;
        let recency = i64_values(&aggregate, RECENCY)?;
        let frequency = i64_values(&aggregate, FREQUENCY)?;
        let monetary = f64_values(&aggregate, MONETARY)?;

        let records: Vec<RfmRecord> = ids
            .into_iter()
            .enumerate()
            .map(|(i, customer_id)| {
                let rfm_code = RfmCode::new(recency_scores[i], frequency_scores[i]);
                RfmRecord {
                    customer_id,
                    recency: recency[i],
                    frequency: frequency[i],
                    monetary: monetary[i],
                    recency_score: recency_scores[i],
                    frequency_score: frequency_scores[i],
                    monetary_score: monetary_scores[i],
                    rfm_code,
                    segment: rfm_code.segment(),
                }
            })
            .collect();

        info!(customers = records.len(), "scored RFM segments");
        Ok(RfmTable::new(records))
    }
}
