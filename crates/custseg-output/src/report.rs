//! Fixed-width text tables for terminal output.

use custseg_cltv::TierSummary;
use custseg_data::CustomerTotals;
use custseg_rfm::SegmentSummary;
use std::fmt;

/// A titled table; the first column is left-aligned, the rest right-aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTable {
    title: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    /// Create an empty table.
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty and extra cells are dropped.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect()
    }

    fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
        for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
            if i == 0 {
                write!(f, "{cell:<width$}")?;
            } else {
                write!(f, "  {cell:>width$}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let rule = "─".repeat(total.max(self.title.chars().count()));

        writeln!(f, "{}", self.title)?;
        writeln!(f, "{rule}")?;
        Self::write_line(f, &self.headers, &widths)?;
        writeln!(f, "{rule}")?;
        for row in &self.rows {
            Self::write_line(f, row, &widths)?;
        }
        writeln!(f, "{rule}")
    }
}

/// Segment sizes and mean metrics.
pub fn segment_table(summaries: &[SegmentSummary]) -> TextTable {
    let mut table = TextTable::new(
        "RFM segments",
        &["segment", "customers", "recency", "frequency", "monetary"],
    );
    for s in summaries {
        table.push_row(vec![
            s.segment.to_string(),
            s.customers.to_string(),
            format!("{:.1}", s.mean_recency),
            format!("{:.2}", s.mean_frequency),
            format!("{:.2}", s.mean_monetary),
        ]);
    }
    table
}

/// CLTV statistics per tier.
pub fn tier_table(summaries: &[TierSummary]) -> TextTable {
    let mut table = TextTable::new(
        "CLTV tiers",
        &["tier", "customers", "mean", "std", "min", "max"],
    );
    for s in summaries {
        table.push_row(vec![
            s.tier.to_string(),
            s.customers.to_string(),
            format!("{:.2}", s.mean),
            s.std.map_or_else(|| "-".to_string(), |std| format!("{std:.2}")),
            format!("{:.2}", s.min),
            format!("{:.2}", s.max),
        ]);
    }
    table
}

/// Customers with their lifetime totals.
pub fn top_customers_table(title: &str, customers: &[CustomerTotals]) -> TextTable {
    let mut table = TextTable::new(title, &["master_id", "total_order", "total_value"]);
    for c in customers {
        table.push_row(vec![
            c.master_id.clone(),
            format!("{:.0}", c.total_order),
            format!("{:.2}", c.total_value),
        ]);
    }
    table
}
