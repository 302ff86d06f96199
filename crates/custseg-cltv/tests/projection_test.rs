//! End-to-end projection over a synthetic repeat-customer aggregate

use custseg_cltv::projector::columns;
use custseg_cltv::{CltvConfig, CltvError, CltvProjector, Tier};
use custseg_data::columns::{FREQUENCY, MASTER_ID, MONETARY_AVG, RECENCY_WEEKS, TENURE_WEEKS};
use polars::prelude::*;

const CUSTOMERS: usize = 40;

fn aggregate() -> DataFrame {
    let mut ids = Vec::with_capacity(CUSTOMERS);
    let mut frequency = Vec::with_capacity(CUSTOMERS);
    let mut recency = Vec::with_capacity(CUSTOMERS);
    let mut tenure = Vec::with_capacity(CUSTOMERS);
    let mut monetary = Vec::with_capacity(CUSTOMERS);

    for i in 0..CUSTOMERS {
        let x = 2 + (i * 7) % 9;
        let t = (20 + (i * 13) % 60) as f64;
        ids.push(format!("c{i:03}"));
        frequency.push(x as i64);
        tenure.push(t);
        recency.push(t * ((i * 5) % 11 + 1) as f64 / 12.0);
        monetary.push(12.0 + ((i * 17) % 23) as f64 + (x % 3) as f64 * 2.5);
    }

    df!(
        MASTER_ID => ids,
        FREQUENCY => frequency,
        RECENCY_WEEKS => recency,
        TENURE_WEEKS => tenure,
        MONETARY_AVG => monetary,
    )
    .unwrap()
}

#[test]
fn test_projection_properties() {
    let table = CltvProjector::new(CltvConfig::default())
        .project(&aggregate())
        .unwrap();

    assert_eq!(table.len(), CUSTOMERS);
    assert_eq!(table.horizons_weeks(), &[12.0, 24.0]);

    let population_mean = table.spend_model().population_mean();
    assert!(population_mean > 0.0);

    for record in &table {
        assert!(record.cltv.is_finite() && record.cltv >= 0.0);
        assert!((0.0..=1.0).contains(&record.probability_alive));
        assert!(record.expected_purchases[1] >= record.expected_purchases[0]);

        let low = record.monetary_avg.min(population_mean) - 1e-9;
        let high = record.monetary_avg.max(population_mean) + 1e-9;
        assert!(record.expected_average_value >= low && record.expected_average_value <= high);
    }

    for tier in Tier::ALL {
        assert_eq!(table.iter().filter(|r| r.tier == tier).count(), CUSTOMERS / 4);
    }
    for a in &table {
        for b in &table {
            if a.cltv < b.cltv {
                assert!(a.tier <= b.tier);
            }
        }
    }
}

#[test]
fn test_records_sorted_and_addressable() {
    let table = CltvProjector::default().project(&aggregate()).unwrap();

    let ids: Vec<&str> = table.iter().map(|r| r.customer_id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    let record = table.get("c007").unwrap();
    assert_eq!(record.frequency, 2 + (7 * 7) % 9);
    assert!(table.get("missing").is_none());
}

#[test]
fn test_frame_and_tier_summary() {
    let table = CltvProjector::default().project(&aggregate()).unwrap();

    let frame = table.to_frame().unwrap();
    assert_eq!(frame.height(), CUSTOMERS);
    assert!(frame.column("exp_purchases_12w").is_ok());
    assert!(frame.column("exp_purchases_24w").is_ok());
    assert!(frame.column(columns::CLTV).is_ok());
    assert!(frame.column(columns::TIER).is_ok());

    let summary = table.tier_summary().unwrap();
    assert_eq!(summary.len(), 4);
    assert_eq!(
        summary.iter().map(|s| s.tier).collect::<Vec<_>>(),
        Tier::ALL.to_vec()
    );
    for row in &summary {
        assert_eq!(row.customers, CUSTOMERS / 4);
        assert!(row.min <= row.mean && row.mean <= row.max);
        assert!(row.std.is_some());
    }
    for pair in summary.windows(2) {
        assert!(pair[0].max <= pair[1].min);
    }
}

#[test]
fn test_longer_horizon_is_worth_more() {
    let short = CltvProjector::default().project(&aggregate()).unwrap();
    let long = CltvProjector::new(CltvConfig {
        horizon_weeks: 52.0,
        ..Default::default()
    })
    .project(&aggregate())
    .unwrap();

    for (s, l) in short.iter().zip(long.iter()) {
        assert!(l.cltv >= s.cltv);
    }
}

#[test]
fn test_single_customer_cannot_be_fitted() {
    let df = aggregate().head(Some(1));
    let result = CltvProjector::default().project(&df);
    assert!(matches!(
        result,
        Err(CltvError::InsufficientCustomers { required: 2, actual: 1 })
    ));
}
