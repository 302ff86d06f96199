//! Raw transaction rows.
//!
//! One row per customer as exported by the shop: lifetime order counts and
//! spend split by channel, order dates and the categories the customer
//! showed interest in over the last 12 months.

use crate::error::{DataError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Customer identifier.
    pub master_id: String,

    /// Channel used for the first order.
    #[serde(default)]
    pub order_channel: Option<String>,

    /// Channel used for the most recent order.
    #[serde(default)]
    pub last_order_channel: Option<String>,

    /// Date of the first order.
    #[serde(with = "date_format")]
    pub first_order_date: NaiveDate,

    /// Date of the most recent order on any channel.
    #[serde(with = "date_format")]
    pub last_order_date: NaiveDate,

    /// Date of the most recent online order.
    #[serde(with = "date_format")]
    pub last_order_date_online: NaiveDate,

    /// Date of the most recent offline order.
    #[serde(with = "date_format")]
    pub last_order_date_offline: NaiveDate,

    /// Lifetime online order count.
    pub order_num_total_ever_online: f64,

    /// Lifetime offline order count.
    pub order_num_total_ever_offline: f64,

    /// Lifetime offline spend.
    pub customer_value_total_ever_offline: f64,

    /// Lifetime online spend.
    pub customer_value_total_ever_online: f64,

    /// Category interest tags, e.g. `[ERKEK, COCUK]`.
    pub interested_in_categories_12: String,
}

impl TransactionRecord {
    /// Parsed category interest tags.
    pub fn category_tags(&self) -> Vec<&str> {
        parse_category_tags(&self.interested_in_categories_12)
    }

    /// Check numeric fields are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("order_num_total_ever_online", self.order_num_total_ever_online),
            ("order_num_total_ever_offline", self.order_num_total_ever_offline),
            ("customer_value_total_ever_online", self.customer_value_total_ever_online),
            ("customer_value_total_ever_offline", self.customer_value_total_ever_offline),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(DataError::NonFinite {
                    customer_id: self.master_id.clone(),
                    field,
                });
            }
            if value < 0.0 {
                return Err(DataError::NegativeValue {
                    customer_id: self.master_id.clone(),
                    field,
                    value,
                });
            }
        }

        Ok(())
    }
}

/// Split a category interest field into tags.
///
/// Accepts the bracketed list form used by the export (`[KADIN, AKTIFSPOR]`),
/// tolerating quotes around tags. An empty list yields no tags.
pub fn parse_category_tags(raw: &str) -> Vec<&str> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|tag| tag.trim().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|tag| !tag.is_empty())
        .collect()
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a date column value, dropping any time component.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).map(|dt| dt.date()))
        .map_err(|_| DataError::InvalidDate {
            value: raw.to_string(),
        })
}

mod date_format {
    use super::{DATE_FORMAT, parse_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("[KADIN]", vec!["KADIN"])]
    #[case("[ERKEK, COCUK]", vec!["ERKEK", "COCUK"])]
    #[case("['AKTIFSPOR', 'KADIN']", vec!["AKTIFSPOR", "KADIN"])]
    #[case("[]", vec![])]
    #[case("ERKEK,KADIN", vec!["ERKEK", "KADIN"])]
    fn test_parse_category_tags(#[case] raw: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_category_tags(raw), expected);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 5, 30).unwrap();
        assert_eq!(parse_date("2021-05-30").unwrap(), expected);
        assert_eq!(parse_date("2021-05-30 14:02:11").unwrap(), expected);
        assert_eq!(parse_date(" 2021-05-30 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let err = parse_date("30/05/2021").unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { ref value } if value == "30/05/2021"));
    }

    #[test]
    fn test_validate_rejects_negative_counts() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let record = TransactionRecord {
            master_id: "c1".to_string(),
            order_channel: None,
            last_order_channel: None,
            first_order_date: date,
            last_order_date: date,
            last_order_date_online: date,
            last_order_date_offline: date,
            order_num_total_ever_online: -1.0,
            order_num_total_ever_offline: 1.0,
            customer_value_total_ever_offline: 10.0,
            customer_value_total_ever_online: 0.0,
            interested_in_categories_12: "[KADIN]".to_string(),
        };

        assert!(matches!(
            record.validate(),
            Err(DataError::NegativeValue { field: "order_num_total_ever_online", .. })
        ));
    }
}
