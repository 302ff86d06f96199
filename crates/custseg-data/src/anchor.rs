//! Analysis anchor date.
//!
//! Recency and tenure are measured against a fixed "today". When none is
//! configured it is placed a fixed number of days after the most recent order
//! in the dataset.

use crate::error::{DataError, Result};
use crate::record::TransactionRecord;
use chrono::{Datelike, Duration, NaiveDate};
use tracing::info;

/// Default gap between the latest order and the derived anchor date.
pub const DEFAULT_ANCHOR_OFFSET_DAYS: i64 = 2;

/// Most recent `last_order_date` across all rows.
pub fn latest_order_date(records: &[TransactionRecord]) -> Option<NaiveDate> {
    records.iter().map(|r| r.last_order_date).max()
}

/// Use the explicit anchor if given, otherwise the latest order date plus
/// `offset_days`.
pub fn resolve_anchor_date(
    records: &[TransactionRecord],
    explicit: Option<NaiveDate>,
    offset_days: i64,
) -> Result<NaiveDate> {
    if let Some(anchor) = explicit {
        info!(%anchor, "using configured anchor date");
        return Ok(anchor);
    }

    let latest = latest_order_date(records).ok_or(DataError::EmptyDataset)?;
    let anchor = latest
        .checked_add_signed(Duration::days(offset_days))
        .ok_or_else(|| DataError::InvalidConfig(format!("anchor offset {offset_days} days overflows")))?;

    info!(%latest, %anchor, "derived anchor date from latest order");
    Ok(anchor)
}

/// Day number used for date arithmetic inside frames.
pub fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}
