//! Conversion between transaction rows and polars frames.

use crate::anchor::day_number;
use crate::columns::{
    FIRST_ORDER_DAY, LAST_ORDER_DAY, MASTER_ID, ORDER_NUM_OFFLINE, ORDER_NUM_ONLINE, VALUE_OFFLINE,
    VALUE_ONLINE,
};
use crate::error::{DataError, Result};
use crate::record::TransactionRecord;
use polars::prelude::*;

/// Build the raw transaction frame.
///
/// Dates are stored as day numbers so that recency and tenure reduce to
/// integer differences.
pub fn transactions_frame(records: &[TransactionRecord]) -> Result<DataFrame> {
    if records.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    let ids: Vec<&str> = records.iter().map(|r| r.master_id.as_str()).collect();
    let orders_online: Vec<f64> = records.iter().map(|r| r.order_num_total_ever_online).collect();
    let orders_offline: Vec<f64> = records.iter().map(|r| r.order_num_total_ever_offline).collect();
    let value_online: Vec<f64> = records.iter().map(|r| r.customer_value_total_ever_online).collect();
    let value_offline: Vec<f64> = records.iter().map(|r| r.customer_value_total_ever_offline).collect();
    let first_days: Vec<i64> = records.iter().map(|r| day_number(r.first_order_date)).collect();
    let last_days: Vec<i64> = records.iter().map(|r| day_number(r.last_order_date)).collect();

    let df = DataFrame::new(vec![
        Series::new(MASTER_ID.into(), ids).into(),
        Series::new(ORDER_NUM_ONLINE.into(), orders_online).into(),
        Series::new(ORDER_NUM_OFFLINE.into(), orders_offline).into(),
        Series::new(VALUE_ONLINE.into(), value_online).into(),
        Series::new(VALUE_OFFLINE.into(), value_offline).into(),
        Series::new(FIRST_ORDER_DAY.into(), first_days).into(),
        Series::new(LAST_ORDER_DAY.into(), last_days).into(),
    ])?;

    Ok(df)
}

/// Values of a numeric column as `f64`, rejecting nulls.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let nulls = column.null_count();
    if nulls > 0 {
        return Err(DataError::NullValues {
            column: name.to_string(),
            count: nulls,
        });
    }

    Ok(column.f64()?.into_no_null_iter().collect())
}

/// Values of an integer column as `i64`, rejecting nulls.
pub fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    let nulls = column.null_count();
    if nulls > 0 {
        return Err(DataError::NullValues {
            column: name.to_string(),
            count: nulls,
        });
    }

    Ok(column.i64()?.into_no_null_iter().collect())
}

/// Values of a string column, rejecting nulls.
pub fn str_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?;
    let nulls = column.null_count();
    if nulls > 0 {
        return Err(DataError::NullValues {
            column: name.to_string(),
            count: nulls,
        });
    }

    Ok(column
        .str()?
        .into_no_null_iter()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, online: f64, first: (i32, u32, u32), last: (i32, u32, u32)) -> TransactionRecord {
        let first = NaiveDate::from_ymd_opt(first.0, first.1, first.2).unwrap();
        let last = NaiveDate::from_ymd_opt(last.0, last.1, last.2).unwrap();
        TransactionRecord {
            master_id: id.to_string(),
            order_channel: None,
            last_order_channel: None,
            first_order_date: first,
            last_order_date: last,
            last_order_date_online: last,
            last_order_date_offline: first,
            order_num_total_ever_online: online,
            order_num_total_ever_offline: 1.0,
            customer_value_total_ever_offline: 50.0,
            customer_value_total_ever_online: 100.0,
            interested_in_categories_12: "[KADIN]".to_string(),
        }
    }

    #[test]
    fn test_transactions_frame_shape() {
        let records = vec![
            record("a", 2.0, (2020, 1, 1), (2021, 1, 1)),
            record("b", 3.0, (2020, 6, 1), (2020, 6, 11)),
        ];

        let df = transactions_frame(&records).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 7);

        assert_eq!(str_values(&df, MASTER_ID).unwrap(), vec!["a", "b"]);
        assert_eq!(f64_values(&df, ORDER_NUM_ONLINE).unwrap(), vec![2.0, 3.0]);

        let first = f64_values(&df, FIRST_ORDER_DAY).unwrap();
        let last = f64_values(&df, LAST_ORDER_DAY).unwrap();
        assert_eq!(last[1] - first[1], 10.0);

        let days = i64_values(&df, LAST_ORDER_DAY).unwrap();
        assert_eq!(days[0] - days[1], 204);
    }

    #[test]
    fn test_empty_records() {
        assert!(matches!(transactions_frame(&[]), Err(DataError::EmptyDataset)));
    }

    #[test]
    fn test_null_values_rejected() {
        let df = DataFrame::new(vec![Series::new("x".into(), [Some(1.0), None]).into()]).unwrap();
        assert!(matches!(
            f64_values(&df, "x"),
            Err(DataError::NullValues { count: 1, .. })
        ));
    }
}
