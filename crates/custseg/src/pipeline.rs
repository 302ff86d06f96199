//! End-to-end analysis.
//!
//! ```text
//! rows ─┬─ frame ─ derive ─ aggregate_rfm ─ RfmScorer ──────────── RfmTable
//!       └─ frame ─ cap ─ derive ─ aggregate_cltv ─ CltvProjector ── CltvTable
//! ```
//!
//! RFM works on raw values; only the CLTV branch is outlier capped.

use crate::config::PipelineConfig;
use crate::error::Result;
use chrono::NaiveDate;
use custseg_cltv::{CltvProjector, CltvTable, TierSummary};
use custseg_data::columns::{CAPPED_COLUMNS, TOTAL_ORDER, TOTAL_VALUE};
use custseg_data::{
    CustomerTotals, OutlierSuppressor, TransactionRecord, aggregate_cltv, aggregate_rfm,
    derive_features, load_transactions, resolve_anchor_date, top_customers, transactions_frame,
};
use custseg_output::{
    SAMPLE_CASE_ONE_FILE, SAMPLE_CASE_TWO_FILE, sample_case_one, sample_case_two,
    write_customer_ids,
};
use custseg_rfm::{RfmScorer, RfmTable, SegmentSummary, segment_summary};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Number of customers in each top-customer list.
pub const TOP_CUSTOMERS: usize = 10;

/// Input rows with the anchor date they are measured against.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<TransactionRecord>,
    anchor: NaiveDate,
}

impl Dataset {
    /// Load a CSV file and resolve the anchor date.
    pub fn load(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<Self> {
        let records = load_transactions(path)?;
        Self::from_records(records, config)
    }

    /// Validate rows and resolve the anchor date.
    pub fn from_records(records: Vec<TransactionRecord>, config: &PipelineConfig) -> Result<Self> {
        for record in &records {
            record.validate()?;
        }
        let anchor =
            resolve_anchor_date(&records, config.anchor_date, config.anchor_offset_days)?;
        Ok(Self { records, anchor })
    }

    /// Input rows in file order.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Reference date for recency and tenure.
    pub const fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    fn features(&self) -> Result<LazyFrame> {
        Ok(derive_features(transactions_frame(&self.records)?.lazy()))
    }

    fn capped_features(&self, config: &PipelineConfig) -> Result<LazyFrame> {
        let frame = transactions_frame(&self.records)?;
        let capped = OutlierSuppressor::new(config.outliers).cap_frame(&frame, &CAPPED_COLUMNS)?;
        Ok(derive_features(capped.lazy()))
    }
}

/// Score every customer and assign RFM segments.
pub fn run_rfm(dataset: &Dataset, config: &PipelineConfig) -> Result<RfmTable> {
    let aggregate = aggregate_rfm(dataset.features()?, dataset.anchor).collect()?;
    info!(customers = aggregate.height(), "aggregated RFM metrics");
    Ok(RfmScorer::new(config.rfm).score(&aggregate)?)
}

/// Per-customer CLTV model inputs after capping and the repeat-customer filter.
pub fn cltv_aggregate(dataset: &Dataset, config: &PipelineConfig) -> Result<DataFrame> {
    let aggregate = aggregate_cltv(
        dataset.capped_features(config)?,
        dataset.anchor,
        config.cltv.min_orders,
    )
    .collect()?;
    info!(
        customers = aggregate.height(),
        min_orders = config.cltv.min_orders,
        "aggregated CLTV inputs"
    );
    Ok(aggregate)
}

/// Fit the CLTV models and project every repeat customer.
pub fn run_cltv(dataset: &Dataset, config: &PipelineConfig) -> Result<CltvTable> {
    let aggregate = cltv_aggregate(dataset, config)?;
    Ok(CltvProjector::new(config.cltv.clone()).project(&aggregate)?)
}

/// Customers with the largest summed spend and order counts.
pub fn top_customer_lists(dataset: &Dataset) -> Result<(Vec<CustomerTotals>, Vec<CustomerTotals>)> {
    let by_value = top_customers(dataset.features()?, TOTAL_VALUE, TOP_CUSTOMERS)?;
    let by_orders = top_customers(dataset.features()?, TOTAL_ORDER, TOP_CUSTOMERS)?;
    Ok((by_value, by_orders))
}

/// Write both sample selections into `dir`, returning each file and its size.
pub fn write_sample_queries(
    dataset: &Dataset,
    rfm: &RfmTable,
    dir: impl AsRef<Path>,
) -> Result<Vec<(PathBuf, usize)>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(custseg_output::ExportError::from)?;

    let mut written = Vec::with_capacity(2);
    for (file, query) in [
        (SAMPLE_CASE_ONE_FILE, sample_case_one()),
        (SAMPLE_CASE_TWO_FILE, sample_case_two()),
    ] {
        let ids = query.select(dataset.records(), rfm);
        let path = dir.join(file);
        write_customer_ids(&path, &ids)?;
        written.push((path, ids.len()));
    }
    Ok(written)
}

/// Results of both analyses.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Anchor date used
    pub anchor: NaiveDate,
    /// Scored customers
    pub rfm: RfmTable,
    /// Per-segment statistics
    pub segments: Vec<SegmentSummary>,
    /// Projected repeat customers
    pub cltv: CltvTable,
    /// Per-tier statistics
    pub tiers: Vec<TierSummary>,
    /// Largest spenders
    pub top_by_value: Vec<CustomerTotals>,
    /// Most frequent buyers
    pub top_by_orders: Vec<CustomerTotals>,
}

impl Analysis {
    /// Run both pipelines over a dataset.
    pub fn run(dataset: &Dataset, config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        info!(rows = dataset.records().len(), anchor = %dataset.anchor, "starting analysis");

        let (top_by_value, top_by_orders) = top_customer_lists(dataset)?;
        let rfm = run_rfm(dataset, config)?;
        let segments = segment_summary(&rfm)?;
        let cltv = run_cltv(dataset, config)?;
        let tiers = cltv.tier_summary()?;

        info!(
            rfm_customers = rfm.len(),
            cltv_customers = cltv.len(),
            "analysis complete"
        );
        Ok(Self {
            anchor: dataset.anchor,
            rfm,
            segments,
            cltv,
            tiers,
            top_by_value,
            top_by_orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custseg_data::DataError;

    fn record(id: &str, last: (i32, u32, u32), online: f64, value: f64) -> TransactionRecord {
        let last = NaiveDate::from_ymd_opt(last.0, last.1, last.2).unwrap();
        let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        TransactionRecord {
            master_id: id.to_string(),
            order_channel: None,
            last_order_channel: None,
            first_order_date: first,
            last_order_date: last,
            last_order_date_online: last,
            last_order_date_offline: first,
            order_num_total_ever_online: online,
            order_num_total_ever_offline: 0.0,
            customer_value_total_ever_offline: 0.0,
            customer_value_total_ever_online: value,
            interested_in_categories_12: "[KADIN]".to_string(),
        }
    }

    #[test]
    fn test_anchor_defaults_to_latest_order_plus_offset() {
        let records = vec![
            record("a", (2021, 5, 30), 2.0, 50.0),
            record("b", (2021, 3, 1), 1.0, 20.0),
        ];
        let dataset = Dataset::from_records(records, &PipelineConfig::default()).unwrap();
        assert_eq!(dataset.anchor(), NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
    }

    #[test]
    fn test_configured_anchor_wins() {
        let config = PipelineConfig {
            anchor_date: NaiveDate::from_ymd_opt(2022, 1, 1),
            ..Default::default()
        };
        let dataset =
            Dataset::from_records(vec![record("a", (2021, 5, 30), 2.0, 50.0)], &config).unwrap();
        assert_eq!(dataset.anchor(), NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let result = Dataset::from_records(
            vec![record("a", (2021, 5, 30), -2.0, 50.0)],
            &PipelineConfig::default(),
        );
        assert!(matches!(
            result,
            Err(crate::Error::Data(DataError::NegativeValue { .. }))
        ));
    }

    #[test]
    fn test_empty_dataset() {
        let result = Dataset::from_records(Vec::new(), &PipelineConfig::default());
        assert!(matches!(
            result,
            Err(crate::Error::Data(DataError::EmptyDataset))
        ));
    }
}
