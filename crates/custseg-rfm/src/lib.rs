#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod code;
pub mod error;
pub mod metrics;
pub mod score;
pub mod scorer;
pub mod segment;
pub mod summary;

pub use code::RfmCode;
pub use error::{Result, ScoringError};
pub use metrics::{FrequencyScorer, MetricScorer, MonetaryScorer, RecencyScorer};
pub use score::{Score, ScoreDirection};
pub use scorer::{RfmConfig, RfmRecord, RfmScorer, RfmTable};
pub use segment::{SEGMENT_RULES, Segment, SegmentRule, UnknownSegment};
pub use summary::{SegmentSummary, segment_summary};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
