//! CSV decoding of uploaded contact sheets into raw rows

use csv::{ReaderBuilder, Trim};
use thiserror::Error;

use crate::models::RawRow;

/// CSV decoding failure
#[derive(Debug, Error)]
pub enum CsvDecodeError {
    #[error("CSV file is empty")]
    Empty,

    #[error("CSV parsing error: {0}")]
    Parse(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Decode CSV text into rows keyed by header name
///
/// Header names are trimmed; cell values are kept as written (the validator
/// trims them). Rows shorter than the header simply lack the trailing columns.
pub fn decode_rows(content: &str, required_columns: &[&str]) -> Result<Vec<RawRow>, CsvDecodeError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if content.trim().is_empty() {
        return Err(CsvDecodeError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CsvDecodeError::Parse(e.to_string()))?
        .clone();

    let missing: Vec<String> = required_columns
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CsvDecodeError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| CsvDecodeError::Parse(format!("row {}: {}", index + 1, e)))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
