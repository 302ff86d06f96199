//! Outlier capping applies to the CLTV inputs only

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use custseg::data::columns::{FREQUENCY, MASTER_ID, MONETARY_AVG};
use custseg::data::{TransactionRecord, f64_values, i64_values, str_values};
use custseg::{Dataset, PipelineConfig, cltv_aggregate, run_rfm};

const CUSTOMERS: usize = 150;

/// `c000` has 5000 online orders worth 100000; everyone else has 2..8 orders.
fn records() -> Vec<TransactionRecord> {
    let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    (0..CUSTOMERS)
        .map(|i| {
            let (online, value) = if i == 0 {
                (5000.0, 100_000.0)
            } else {
                (1.0 + (i % 7) as f64, 50.0 + i as f64 * 3.7)
            };
            let last = first + Duration::days(200 + (i % 90) as i64);
            TransactionRecord {
                master_id: format!("c{i:03}"),
                order_channel: None,
                last_order_channel: None,
                first_order_date: first,
                last_order_date: last,
                last_order_date_online: last,
                last_order_date_offline: first,
                order_num_total_ever_online: online,
                order_num_total_ever_offline: 1.0,
                customer_value_total_ever_offline: 10.0,
                customer_value_total_ever_online: value,
                interested_in_categories_12: "[KADIN]".to_string(),
            }
        })
        .collect()
}

#[test]
fn test_extreme_customer_is_capped_for_cltv_only() {
    let config = PipelineConfig::default();
    let dataset = Dataset::from_records(records(), &config).unwrap();

    // online orders: nearest-rank 1st/99th percentiles are 1 and 7, so the
    // upper fence is 7 + 1.5 * 6 = 16; offline orders are constant
    let aggregate = cltv_aggregate(&dataset, &config).unwrap();
    assert_eq!(aggregate.height(), CUSTOMERS);
    let ids = str_values(&aggregate, MASTER_ID).unwrap();
    assert_eq!(ids[0], "c000");
    assert_eq!(i64_values(&aggregate, FREQUENCY).unwrap()[0], 17);

    // online value fence: 601.3 + 1.5 * (601.3 - 57.4)
    let monetary_avg = f64_values(&aggregate, MONETARY_AVG).unwrap()[0];
    assert_relative_eq!(monetary_avg, (1417.15 + 10.0) / 17.0, max_relative = 1e-9);

    // customers inside the fence are untouched
    let frequency = i64_values(&aggregate, FREQUENCY).unwrap();
    for (i, &f) in frequency.iter().enumerate().skip(1) {
        assert_eq!(f, 2 + (i % 7) as i64);
    }

    let rfm = run_rfm(&dataset, &config).unwrap();
    let extreme = rfm.get("c000").unwrap();
    assert_eq!(extreme.frequency, 5001);
    assert_relative_eq!(extreme.monetary, 100_010.0);
}
