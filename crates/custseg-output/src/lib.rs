#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod query;
pub mod report;

pub use export::{ExportError, ExportFormat, Exporter};
pub use query::{
    CategoryFilter, SAMPLE_CASE_ONE_FILE, SAMPLE_CASE_TWO_FILE, SegmentQuery, read_customer_ids,
    sample_case_one, sample_case_two, write_customer_ids,
};
pub use report::{TextTable, segment_table, tier_table, top_customers_table};
