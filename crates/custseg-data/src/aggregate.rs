//! Per-customer aggregation.
//!
//! Both aggregators expect the transaction frame after [`derive_features`]
//! and return one row per `master_id`, sorted by id.
//!
//! [`derive_features`]: crate::features::derive_features

use crate::anchor::day_number;
use crate::columns::{
    FIRST_ORDER_DAY, FREQUENCY, LAST_ORDER_DAY, MASTER_ID, MONETARY, MONETARY_AVG, RECENCY,
    RECENCY_WEEKS, TENURE_WEEKS, TOTAL_ORDER, TOTAL_VALUE,
};
use crate::error::Result;
use crate::frame::{f64_values, str_values};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const DAYS_PER_WEEK: f64 = 7.0;

/// Aggregate rows into RFM metrics.
///
/// Output columns: `master_id`, `recency` (days from the last order to
/// `anchor`), `frequency` (row order counts truncated to integers, summed)
/// and `monetary` (total spend).
pub fn aggregate_rfm(data: LazyFrame, anchor: NaiveDate) -> LazyFrame {
    let anchor_day = day_number(anchor);

    data.group_by([col(MASTER_ID)])
        .agg([
            col(LAST_ORDER_DAY).max(),
            col(TOTAL_ORDER).cast(DataType::Int64).sum().alias(FREQUENCY),
            col(TOTAL_VALUE).sum().alias(MONETARY),
        ])
        .with_columns([(lit(anchor_day) - col(LAST_ORDER_DAY)).alias(RECENCY)])
        .select([col(MASTER_ID), col(RECENCY), col(FREQUENCY), col(MONETARY)])
        .sort([MASTER_ID], Default::default())
}

/// Aggregate rows into the CLTV model inputs.
///
/// Keeps customers whose summed `total_order` exceeds `min_orders`. Output
/// columns: `master_id`, `frequency` (integer order count), `recency_weeks`
/// (first to last order), `tenure_weeks` (first order to `anchor`),
/// `monetary_avg` (spend per order) and `total_value`.
pub fn aggregate_cltv(data: LazyFrame, anchor: NaiveDate, min_orders: f64) -> LazyFrame {
    let anchor_day = day_number(anchor);

    data.group_by([col(MASTER_ID)])
        .agg([
            col(FIRST_ORDER_DAY).min(),
            col(LAST_ORDER_DAY).max(),
            col(TOTAL_ORDER).sum(),
            col(TOTAL_VALUE).sum(),
        ])
        .filter(col(TOTAL_ORDER).gt(lit(min_orders)))
        .with_columns([
            col(TOTAL_ORDER).cast(DataType::Int64).alias(FREQUENCY),
            ((col(LAST_ORDER_DAY) - col(FIRST_ORDER_DAY)).cast(DataType::Float64)
                / lit(DAYS_PER_WEEK))
            .alias(RECENCY_WEEKS),
            ((lit(anchor_day) - col(FIRST_ORDER_DAY)).cast(DataType::Float64)
                / lit(DAYS_PER_WEEK))
            .alias(TENURE_WEEKS),
        ])
        .with_columns([
            (col(TOTAL_VALUE) / col(FREQUENCY).cast(DataType::Float64)).alias(MONETARY_AVG)
        ])
        .select([
            col(MASTER_ID),
            col(FREQUENCY),
            col(RECENCY_WEEKS),
            col(TENURE_WEEKS),
            col(MONETARY_AVG),
            col(TOTAL_VALUE),
        ])
        .sort([MASTER_ID], Default::default())
}

/// Lifetime totals of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerTotals {
    /// Customer identifier
    pub master_id: String,
    /// Summed order count
    pub total_order: f64,
    /// Summed spend
    pub total_value: f64,
}

/// The `n` customers with the largest summed `by` column.
///
/// `by` is [`TOTAL_VALUE`] or [`TOTAL_ORDER`]; ties are broken by id.
pub fn top_customers(data: LazyFrame, by: &str, n: usize) -> Result<Vec<CustomerTotals>> {
    let top = data
        .group_by([col(MASTER_ID)])
        .agg([col(TOTAL_ORDER).sum(), col(TOTAL_VALUE).sum()])
        .sort(
            [by, MASTER_ID],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .limit(IdxSize::try_from(n).unwrap_or(IdxSize::MAX))
        .collect()?;

    let ids = str_values(&top, MASTER_ID)?;
    let orders = f64_values(&top, TOTAL_ORDER)?;
    let values = f64_values(&top, TOTAL_VALUE)?;

    Ok(ids
        .into_iter()
        .zip(orders)
        .zip(values)
        .map(|((master_id, total_order), total_value)| CustomerTotals {
            master_id,
            total_order,
            total_value,
        })
        .collect())
}
