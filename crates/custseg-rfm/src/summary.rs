//! Per-segment descriptive statistics.

use crate::error::{Result, ScoringError};
use crate::scorer::{RfmTable, columns::SEGMENT};
use crate::segment::Segment;
use custseg_data::columns::{FREQUENCY, MONETARY, RECENCY};
use custseg_data::{f64_values, i64_values, str_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const CUSTOMERS: &str = "customers";

/// Size and mean metrics of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    /// Segment
    pub segment: Segment,
    /// Number of customers
    pub customers: usize,
    /// Mean days since last order
    pub mean_recency: f64,
    /// Mean order count
    pub mean_frequency: f64,
    /// Mean total spend
    pub mean_monetary: f64,
}

/// Summaries of every populated segment, largest first.
pub fn segment_summary(table: &RfmTable) -> Result<Vec<SegmentSummary>> {
    if table.is_empty() {
        return Err(ScoringError::EmptyInput);
    }

    let summary = table
        .to_frame()?
        .lazy()
        .group_by([col(SEGMENT)])
        .agg([
            len().alias(CUSTOMERS),
            col(RECENCY).cast(DataType::Float64).mean(),
            col(FREQUENCY).cast(DataType::Float64).mean(),
            col(MONETARY).mean(),
        ])
        .sort(
            [CUSTOMERS, SEGMENT],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    let segments = str_values(&summary, SEGMENT)?;
    let customers = i64_values(&summary, CUSTOMERS)?;
    let recency = f64_values(&summary, RECENCY)?;
    let frequency = f64_values(&summary, FREQUENCY)?;
    let monetary = f64_values(&summary, MONETARY)?;

    segments
        .iter()
        .enumerate()
        .map(|(i, label)| -> Result<SegmentSummary> {
            let segment = label.parse::<Segment>()?;
            Ok(SegmentSummary {
                segment,
                customers: usize::try_from(customers[i]).unwrap_or_default(),
                mean_recency: recency[i],
                mean_frequency: frequency[i],
                mean_monetary: monetary[i],
            })
        })
        .collect()
}
