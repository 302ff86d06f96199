#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export member crates
pub use custseg_cltv as cltv;
pub use custseg_data as data;
pub use custseg_output as output;
pub use custseg_rfm as rfm;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::{
    Analysis, Dataset, TOP_CUSTOMERS, cltv_aggregate, run_cltv, run_rfm, top_customer_lists,
    write_sample_queries,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
