//! Raw input table
//!
//! The upload surface hands the pipeline a table of text cells. Every cell
//! stays text here: phone numbers must never go through a numeric type.

use crate::domain::{IysError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Recipient phone number column
pub const COLUMN_RECIPIENT: &str = "ALICI";
/// Approval flag column (`1` grants, `0` revokes)
pub const COLUMN_APPROVAL: &str = "ONAY(1)-RET(0)";
/// Consent timestamp column (`DD-MM-YYYY HH:MM:SS`)
pub const COLUMN_TIMESTAMP: &str = "IZIN TARIHI";
/// Consent type column
pub const COLUMN_CONSENT_TYPE: &str = "IZIN TURU";
/// Consent source column
pub const COLUMN_SOURCE: &str = "IZIN KAYNAGI";

/// Columns every input table must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COLUMN_RECIPIENT,
    COLUMN_APPROVAL,
    COLUMN_TIMESTAMP,
    COLUMN_CONSENT_TYPE,
    COLUMN_SOURCE,
];

/// One row of the input table, cells still raw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based data row (the header is row 0)
    pub row: usize,
    pub recipient: String,
    pub approval_flag: String,
    pub consent_timestamp: String,
    pub consent_type: String,
    pub source: String,
}

/// Header plus rows of text cells
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from already split cells
    ///
    /// Header names are trimmed and a leading byte-order mark is dropped.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Self { headers, rows }
    }

    /// Read a CSV table with a header row
    ///
    /// Rows may have fewer cells than the header; missing cells read as empty.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the CSV is malformed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// Read a CSV file from disk
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, or a validation
    /// error if it is not valid CSV.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| IysError::Io(format!("Failed to open {}: {e}", path.display())))?;
        let table = Self::from_reader(file)?;

        tracing::debug!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.rows.len(),
            "Input table loaded"
        );

        Ok(table)
    }

    /// Column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of data rows with at least one non-blank cell
    pub fn data_row_count(&self) -> usize {
        self.rows.iter().filter(|row| !is_blank_row(row)).count()
    }

    /// Required columns absent from the header, sorted
    pub fn missing_columns(&self) -> Vec<&'static str> {
        let mut missing: Vec<&'static str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !self.headers.iter().any(|h| h == required))
            .collect();
        missing.sort_unstable();
        missing
    }

    /// Extract the required columns of every non-blank row
    ///
    /// # Errors
    ///
    /// Returns a validation error naming every missing required column.
    pub fn records(&self) -> Result<Vec<RawRecord>> {
        let missing = self.missing_columns();
        if !missing.is_empty() {
            return Err(IysError::Validation(format!(
                "Input is missing required columns: {}",
                missing.join(", ")
            )));
        }

        let positions: HashMap<&str, usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        let cell = |row: &[String], column: &str| -> String {
            positions
                .get(column)
                .and_then(|&i| row.get(i))
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };

        let records = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !is_blank_row(row))
            .map(|(i, row)| RawRecord {
                row: i + 1,
                recipient: cell(row, COLUMN_RECIPIENT),
                approval_flag: cell(row, COLUMN_APPROVAL),
                consent_timestamp: cell(row, COLUMN_TIMESTAMP),
                consent_type: cell(row, COLUMN_CONSENT_TYPE),
                source: cell(row, COLUMN_SOURCE),
            })
            .collect();

        Ok(records)
    }
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|value| value.trim().is_empty())
}
