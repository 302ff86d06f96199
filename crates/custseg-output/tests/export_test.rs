//! File exports of scored customers and query selections

use chrono::NaiveDate;
use custseg_data::read_transactions;
use custseg_output::{
    CategoryFilter, ExportFormat, Exporter, SegmentQuery, read_customer_ids, write_customer_ids,
};
use custseg_rfm::{RfmCode, RfmRecord, RfmTable, Score, Segment};

const CSV: &str = "\
master_id,order_channel,last_order_channel,first_order_date,last_order_date,last_order_date_online,last_order_date_offline,order_num_total_ever_online,order_num_total_ever_offline,customer_value_total_ever_offline,customer_value_total_ever_online,interested_in_categories_12
c1,Android App,Offline,2020-10-30,2021-02-26,2021-02-21,2021-02-26,4.0,1.0,139.99,799.38,[KADIN]
c2,Android App,Mobile,2017-02-08,2021-02-16,2021-02-16,2020-01-10,19.0,2.0,159.97,1853.58,\"[ERKEK, COCUK, KADIN, AKTIFSPOR]\"
c3,Desktop,Desktop,2019-11-27,2019-11-27,2019-11-27,2019-11-27,1.0,1.0,49.99,120.48,[ERKEK]
";

fn rfm_table() -> RfmTable {
    let scored = |id: &str, recency: Score, frequency: Score| {
        let code = RfmCode::new(recency, frequency);
        RfmRecord {
            customer_id: id.to_string(),
            recency: 3,
            frequency: 5,
            monetary: 939.5,
            recency_score: recency,
            frequency_score: frequency,
            monetary_score: Score::Four,
            rfm_code: code,
            segment: code.segment(),
        }
    };
    RfmTable::new(vec![
        scored("c1", Score::Five, Score::Four),
        scored("c2", Score::Four, Score::Five),
        scored("c3", Score::One, Score::One),
    ])
}

#[test]
fn test_query_selection_round_trip() {
    let records = read_transactions(CSV.as_bytes()).unwrap();
    let table = rfm_table();
    assert_eq!(
        records[1].first_order_date,
        NaiveDate::from_ymd_opt(2017, 2, 8).unwrap()
    );

    let query = SegmentQuery::new(
        vec![Segment::Champions, Segment::LoyalCustomers],
        CategoryFilter::AllOf(vec!["KADIN".to_string()]),
    );
    let ids = query.select(&records, &table);
    assert_eq!(ids, vec!["c1", "c2"]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("selection.csv");
    write_customer_ids(&path, &ids).unwrap();
    assert_eq!(read_customer_ids(&path).unwrap(), ids);
}

#[test]
fn test_rfm_json_file_reloads() {
    let table = rfm_table();
    let dir = tempfile::tempdir().unwrap();
    let path = dir
        .path()
        .join(format!("rfm.{}", ExportFormat::PrettyJson.extension()));

    table.export_to_file(&path, ExportFormat::PrettyJson).unwrap();
    let reloaded: Vec<RfmRecord> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded.as_slice(), table.records());
}

#[test]
fn test_rfm_csv_file_has_one_row_per_customer() {
    let table = rfm_table();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rfm.csv");

    table.export_to_file(&path, ExportFormat::Csv).unwrap();
    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let segments: Vec<String> = rdr
        .records()
        .map(|r| r.unwrap().get(8).unwrap().to_string())
        .collect();
    assert_eq!(segments, vec!["champions", "loyal_customers", "hibernating"]);
}
