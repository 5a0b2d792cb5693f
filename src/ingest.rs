//! CSV ingestion.
//!
//! Rows are read with a header line, comma delimiter and no quote character:
//! a `"` is an ordinary byte kept in the cell. Every cell stays a string and
//! nothing is turned into a null; blank handling belongs to coercion.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::coerce::RawRecord;

/// Errors raised while turning bytes into raw records.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// IO error reading the input file
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The input is not UTF-8 text
    #[error("input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The CSV structure could not be read
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A row has more cells than the header has columns
    #[error("row {row} has {found} fields, header has {expected}")]
    TooManyFields {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// The header line is missing
    #[error("input has no header row")]
    MissingHeader,
}

/// Parses CSV bytes into raw records, one per data row.
///
/// A row shorter than the header leaves its trailing columns out of the
/// record; a longer row is an error.
///
/// # Example
///
/// ```rust
/// use rowguard::ingest::read_records;
///
/// let records = read_records(b"LoanNumber,Note\n12345,\"as is\"\n").unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0]["LoanNumber"], "12345");
/// assert_eq!(records[0]["Note"], "\"as is\"");
/// ```
pub fn read_records(bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    let text = std::str::from_utf8(bytes)?;
    if text.trim().is_empty() {
        return Err(IngestError::MissingHeader);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .quoting(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() > headers.len() {
            return Err(IngestError::TooManyFields {
                row: index + 1,
                found: row.len(),
                expected: headers.len(),
            });
        }
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| (column.clone(), cell.to_string()))
            .collect();
        records.push(record);
    }

    debug!(rows = records.len(), columns = headers.len(), "parsed CSV input");
    Ok(records)
}

/// Reads and parses a CSV file.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<RawRecord>, IngestError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| IngestError::Io(path.to_path_buf(), e))?;
    read_records(&bytes)
}
