#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod anchor;
pub mod columns;
pub mod error;
pub mod features;
pub mod frame;
pub mod loader;
pub mod outliers;
pub mod quantile;
pub mod record;

pub use aggregate::{CustomerTotals, aggregate_cltv, aggregate_rfm, top_customers};
pub use anchor::{latest_order_date, resolve_anchor_date};
pub use error::{DataError, Result};
pub use features::derive_features;
pub use frame::{f64_values, i64_values, str_values, transactions_frame};
pub use loader::{load_transactions, read_transactions};
pub use outliers::{Fence, OutlierConfig, OutlierSuppressor};
pub use quantile::{QuantileError, QuantileMethod, assign_bins, quantile, quantile_bins, quantile_edges};
pub use record::{TransactionRecord, parse_category_tags, parse_date};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
