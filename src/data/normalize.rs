//! Spreadsheet normalization
//!
//! Converts a raw xlsx byte buffer into a header row and an ordered sequence
//! of field-keyed records. Only the first sheet is read; fully blank rows are
//! dropped wherever they occur; short rows are padded with empty strings and
//! long rows are truncated to the header width.

use calamine::{DataType, Reader, Xlsx, XlsxError};
use serde_json::Value;
use std::io::Cursor;
use thiserror::Error;

use super::Record;

/// Errors that can occur when parsing a spreadsheet export
#[derive(Debug, Error)]
pub enum ParseError {
    /// The byte buffer is not a well-formed xlsx workbook
    #[error("not a readable workbook: {0}")]
    Workbook(#[from] XlsxError),

    /// The workbook contains no sheets to read
    #[error("workbook contains no sheets")]
    NoSheets,

    /// The first sheet has no non-blank rows, so there is no header row
    #[error("sheet contains no non-blank rows")]
    Empty,
}

/// Normalizes raw xlsx bytes into `(headers, records)`.
///
/// The first surviving (non-blank) row becomes the header row; every later
/// surviving row is zipped against it positionally: the cell at position `i`
/// maps to the header at position `i`, missing cells default to `""`, and
/// cells beyond the header width are silently dropped. When two headers share
/// the same name, later columns overwrite earlier ones under that key
/// (documented behavior, not corrected). Row order is preserved; it is the
/// display order downstream.
///
/// A sheet with only a header row yields an empty record sequence, not an
/// error; a sheet with no non-blank rows at all has no header row to read
/// and fails with `ParseError::Empty`.
pub fn normalize(bytes: &[u8]) -> Result<(Vec<String>, Vec<Record>), ParseError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoSheets)??;

    let mut rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_string().unwrap_or_default())
                .collect::<Vec<String>>()
        })
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()));

    let headers: Vec<String> = rows.next().ok_or(ParseError::Empty)?;

    let records: Vec<Record> = rows
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = cells.get(i).cloned().unwrap_or_default();
                    (header.clone(), Value::String(value))
                })
                .collect()
        })
        .collect();

    Ok((headers, records))
}
