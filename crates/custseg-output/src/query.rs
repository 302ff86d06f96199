//! Customer selections by segment and category interest.
//!
//! A [`SegmentQuery`] walks the raw rows in file order, keeps each customer
//! whose RFM segment is listed and whose `interested_in_categories_12` tags
//! satisfy the [`CategoryFilter`], and yields every id once.
//!
//! Tags are matched as whole entries of the parsed list, so
//! [`sample_case_two`] needs both `ERKEK` and `COCUK` to be present.

use crate::export::ExportError;
use custseg_data::TransactionRecord;
use custseg_data::columns::MASTER_ID;
use custseg_rfm::{RfmTable, Segment};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// File written for [`sample_case_one`].
pub const SAMPLE_CASE_ONE_FILE: &str = "SampleCaseOne.csv";

/// File written for [`sample_case_two`].
pub const SAMPLE_CASE_TWO_FILE: &str = "SampleCaseTwo.csv";

/// Constraint on a customer's category interest tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tags")]
pub enum CategoryFilter {
    /// No constraint
    #[default]
    Any,
    /// Every listed tag must be present
    AllOf(Vec<String>),
    /// At least one listed tag must be present
    AnyOf(Vec<String>),
}

impl CategoryFilter {
    /// Whether a parsed tag list satisfies the filter.
    pub fn matches(&self, tags: &[&str]) -> bool {
        match self {
            Self::Any => true,
            Self::AllOf(wanted) => wanted.iter().all(|w| tags.contains(&w.as_str())),
            Self::AnyOf(wanted) => wanted.iter().any(|w| tags.contains(&w.as_str())),
        }
    }
}

/// Segment membership plus a category filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentQuery {
    /// Accepted segments
    pub segments: Vec<Segment>,
    /// Category constraint
    #[serde(default)]
    pub categories: CategoryFilter,
}

impl SegmentQuery {
    /// Create a query.
    pub const fn new(segments: Vec<Segment>, categories: CategoryFilter) -> Self {
        Self {
            segments,
            categories,
        }
    }

    /// Ids of matching customers in row order, each once.
    ///
    /// Rows whose customer is missing from `rfm` never match.
    pub fn select(&self, records: &[TransactionRecord], rfm: &RfmTable) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for record in records {
            let in_segment = rfm
                .get(&record.master_id)
                .is_some_and(|scored| self.segments.contains(&scored.segment));
            if in_segment
                && self.categories.matches(&record.category_tags())
                && seen.insert(record.master_id.as_str())
            {
                ids.push(record.master_id.clone());
            }
        }

        debug!(
            segments = ?self.segments,
            categories = ?self.categories,
            matched = ids.len(),
            "ran segment query"
        );
        ids
    }
}

/// Champions and loyal customers interested in `KADIN`.
pub fn sample_case_one() -> SegmentQuery {
    SegmentQuery::new(
        vec![Segment::Champions, Segment::LoyalCustomers],
        CategoryFilter::AllOf(vec!["KADIN".to_string()]),
    )
}

/// Can't-lose, hibernating and new customers interested in both `ERKEK` and
/// `COCUK`.
pub fn sample_case_two() -> SegmentQuery {
    SegmentQuery::new(
        vec![Segment::CantLose, Segment::Hibernating, Segment::NewCustomers],
        CategoryFilter::AllOf(vec!["ERKEK".to_string(), "COCUK".to_string()]),
    )
}

#[derive(Debug, Serialize, Deserialize)]
struct IdRow {
    master_id: String,
}

/// Write customer ids as a single `master_id` column.
pub fn write_customer_ids(path: impl AsRef<Path>, ids: &[String]) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    for id in ids {
        wtr.serialize(IdRow {
            master_id: id.clone(),
        })?;
    }
    // A header is still written for an empty selection.
    if ids.is_empty() {
        wtr.write_record([MASTER_ID])?;
    }
    wtr.flush()?;

    info!(path = %path.display(), customers = ids.len(), "wrote customer ids");
    Ok(())
}

/// Read customer ids written by [`write_customer_ids`].
pub fn read_customer_ids(path: impl AsRef<Path>) -> Result<Vec<String>, ExportError> {
    let mut rdr = csv::Reader::from_path(path)?;
    rdr.deserialize::<IdRow>()
        .map(|row| Ok(row?.master_id))
        .collect()
}
