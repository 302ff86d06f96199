//! CSV loading.

use crate::error::{DataError, Result};
use crate::record::TransactionRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Load and validate every transaction row from a CSV file.
///
/// A missing file, a header without the required columns, an empty or
/// unparsable required field, and a file with no rows are all fatal.
pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<TransactionRecord>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening transaction file");

    let file = File::open(path)?;
    let records = read_transactions(file)?;

    info!(path = %path.display(), rows = records.len(), "loaded transactions");
    Ok(records)
}

/// Read and validate transaction rows from any CSV source.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = csv_reader
        .deserialize()
        .collect::<std::result::Result<Vec<TransactionRecord>, csv::Error>>()?;

    if records.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    for record in &records {
        record.validate()?;
    }

    Ok(records)
}
