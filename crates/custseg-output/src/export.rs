//! CSV and JSON export of scored and projected customers.

use custseg_cltv::projector::columns as cltv_columns;
use custseg_cltv::{CltvTable, TierSummary};
use custseg_data::columns::{FREQUENCY, MASTER_ID, MONETARY_AVG, RECENCY_WEEKS, TENURE_WEEKS};
use custseg_rfm::{RfmRecord, RfmTable, SegmentSummary};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A record has no value for an expected column.
    #[error("Customer {customer_id} has no value for column {column}")]
    MissingColumn {
        /// Customer identifier
        customer_id: String,
        /// Column name
        column: String,
    },
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        debug!(path = %path.display(), bytes = content.len(), "wrote export");
        Ok(())
    }
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn to_json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    Ok(match format {
        ExportFormat::PrettyJson => serde_json::to_string_pretty(value)?,
        _ => serde_json::to_string(value)?,
    })
}

fn export_rows<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for row in rows {
                wtr.serialize(row)?;
            }
            into_string(wtr)
        }
        ExportFormat::Json | ExportFormat::PrettyJson => to_json(rows, format),
    }
}

/// CSV row of an RFM record.
#[derive(Debug, Serialize)]
struct RfmRow<'a> {
    master_id: &'a str,
    recency: i64,
    frequency: i64,
    monetary: f64,
    recency_score: u8,
    frequency_score: u8,
    monetary_score: u8,
    rfm_code: String,
    segment: &'static str,
}

impl<'a> From<&'a RfmRecord> for RfmRow<'a> {
    fn from(record: &'a RfmRecord) -> Self {
        Self {
            master_id: &record.customer_id,
            recency: record.recency,
            frequency: record.frequency,
            monetary: record.monetary,
            recency_score: record.recency_score.value(),
            frequency_score: record.frequency_score.value(),
            monetary_score: record.monetary_score.value(),
            rfm_code: record.rfm_code.to_string(),
            segment: record.segment.as_str(),
        }
    }
}

impl Exporter for RfmTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let rows: Vec<RfmRow<'_>> = self.iter().map(RfmRow::from).collect();
                export_rows(&rows, format)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self.records(), format),
        }
    }
}

impl Exporter for CltvTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        if !matches!(format, ExportFormat::Csv) {
            return to_json(self, format);
        }

        let horizon_columns: Vec<String> = self
            .horizons_weeks()
            .iter()
            .map(|&weeks| cltv_columns::expected_purchases(weeks))
            .collect();

        let mut header = vec![
            MASTER_ID.to_string(),
            FREQUENCY.to_string(),
            RECENCY_WEEKS.to_string(),
            TENURE_WEEKS.to_string(),
            MONETARY_AVG.to_string(),
        ];
        header.extend(horizon_columns.iter().cloned());
        header.extend(
            [
                cltv_columns::PROBABILITY_ALIVE,
                cltv_columns::EXPECTED_AVERAGE_VALUE,
                cltv_columns::CLTV,
                cltv_columns::TIER,
            ]
            .map(String::from),
        );

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(&header)?;

        for record in self {
            let mut row = vec![
                record.customer_id.clone(),
                record.frequency.to_string(),
                record.recency_weeks.to_string(),
                record.tenure_weeks.to_string(),
                record.monetary_avg.to_string(),
            ];
            for (i, column) in horizon_columns.iter().enumerate() {
                let value = record.expected_purchases.get(i).ok_or_else(|| {
                    ExportError::MissingColumn {
                        customer_id: record.customer_id.clone(),
                        column: column.clone(),
                    }
                })?;
                row.push(value.to_string());
            }
            row.push(record.probability_alive.to_string());
            row.push(record.expected_average_value.to_string());
            row.push(record.cltv.to_string());
            row.push(record.tier.to_string());
            wtr.write_record(&row)?;
        }

        into_string(wtr)
    }
}

impl Exporter for Vec<SegmentSummary> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        export_rows(self, format)
    }
}

impl Exporter for Vec<TierSummary> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        export_rows(self, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custseg_cltv::{
        BetaGeoModel, BetaGeoParams, CltvRecord, GammaGammaModel, GammaGammaParams, Tier,
    };
    use custseg_rfm::{RfmCode, Score};

    fn rfm_table() -> RfmTable {
        let record = |id: &str, recency: Score, frequency: Score, monetary: Score| {
            let code = RfmCode::new(recency, frequency);
            RfmRecord {
                customer_id: id.to_string(),
                recency: 10,
                frequency: 4,
                monetary: 250.5,
                recency_score: recency,
                frequency_score: frequency,
                monetary_score: monetary,
                rfm_code: code,
                segment: code.segment(),
            }
        };
        RfmTable::new(vec![
            record("a1", Score::Five, Score::Five, Score::Four),
            record("b2", Score::One, Score::Two, Score::One),
        ])
    }

    fn cltv_table() -> CltvTable {
        let purchases = BetaGeoModel::from_params(BetaGeoParams {
            r: 0.25,
            alpha: 4.4,
            a: 0.8,
            b: 2.4,
        });
        let spend = GammaGammaModel::from_params(GammaGammaParams {
            p: 6.2,
            q: 3.7,
            v: 15.4,
        })
        .unwrap();
        let record = CltvRecord {
            customer_id: "a1".to_string(),
            frequency: 3,
            recency_weeks: 20.0,
            tenure_weeks: 30.0,
            monetary_avg: 42.0,
            expected_purchases: vec![0.4, 0.7],
            probability_alive: 0.9,
            expected_average_value: 40.5,
            cltv: 80.25,
            tier: Tier::A,
        };
        CltvTable::new(vec![12.0, 24.0], vec![record], purchases, spend)
    }

    #[test]
    fn test_rfm_csv() {
        let csv = rfm_table().export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "master_id,recency,frequency,monetary,recency_score,frequency_score,monetary_score,rfm_code,segment"
        );
        assert_eq!(lines.next().unwrap(), "a1,10,4,250.5,5,5,4,55,champions");
        assert_eq!(lines.next().unwrap(), "b2,10,4,250.5,1,2,1,12,hibernating");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_rfm_json() {
        let json = rfm_table().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"segment\":\"champions\""));
        assert!(json.contains("\"rfm_code\":\"55\""));

        let pretty = rfm_table().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains("  "));
    }

    #[test]
    fn test_cltv_csv_has_horizon_columns() {
        let csv = cltv_table().export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "master_id,frequency,recency_weeks,tenure_weeks,monetary_avg,exp_purchases_12w,exp_purchases_24w,probability_alive,exp_average_value,cltv,tier"
        );
        assert_eq!(lines.next().unwrap(), "a1,3,20,30,42,0.4,0.7,0.9,40.5,80.25,A");
    }

    #[test]
    fn test_cltv_missing_horizon_value() {
        let table = cltv_table();
        let mut records = table.records().to_vec();
        records[0].expected_purchases.pop();
        let broken = CltvTable::new(
            vec![12.0, 24.0],
            records,
            *table.purchase_model(),
            *table.spend_model(),
        );

        let result = broken.export_to_string(ExportFormat::Csv);
        assert!(matches!(
            result,
            Err(ExportError::MissingColumn { ref column, .. }) if column == "exp_purchases_24w"
        ));
    }

    #[test]
    fn test_cltv_json_includes_models() {
        let json = cltv_table().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"horizons_weeks\":[12.0,24.0]"));
        assert!(json.contains("\"purchase_model\""));
        assert!(json.contains("\"tier\":\"A\""));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("rfm.{}", ExportFormat::Csv.extension()));

        rfm_table().export_to_file(&path, ExportFormat::Csv).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("champions"));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
