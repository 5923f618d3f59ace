//! Core data models for Sheetserve
//!
//! This module contains the types shared across the pipeline: the normalized
//! record map, the cached `Dataset`, and the fetch/normalize submodules.

pub mod fetch;
pub mod normalize;

pub use fetch::{FetchError, SheetFetcher};
pub use normalize::{normalize, ParseError};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single normalized spreadsheet row, keyed by header name.
///
/// Backed by a `serde_json::Map` (with insertion order preserved) so that the
/// JSON output lists fields in header order. Every record carries exactly the
/// header key set; values are always JSON strings, with missing or blank
/// cells represented as `""` rather than null.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A fully normalized spreadsheet snapshot, the unit of caching.
///
/// Overwritten wholesale on every successful refresh; callers receive shared
/// immutable views (`Arc<Dataset>`), never a handle that can mutate the
/// cached copy.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// Column names, in source order
    pub fields: Vec<String>,
    /// One record per non-blank data row, in source order
    pub records: Vec<Record>,
    /// Number of records (excluding the header row)
    pub total_records: usize,
    /// When this snapshot was fetched from the remote export
    pub fetched_at: DateTime<Utc>,
}

impl Dataset {
    /// Builds a Dataset from a normalized (headers, records) pair, stamping
    /// the current time as the fetch timestamp.
    pub fn new(fields: Vec<String>, records: Vec<Record>) -> Self {
        let total_records = records.len();
        Self {
            fields,
            records,
            total_records,
            fetched_at: Utc::now(),
        }
    }

    /// Projects a single column out of every record, in record order.
    ///
    /// Records where the field is blank or absent are dropped (a documented
    /// filter, not an error); an unknown field name therefore yields an empty
    /// vector.
    pub fn project_field(&self, field: &str) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|record| record.get(field).and_then(|v| v.as_str()))
            .filter(|value| !value.is_empty())
            .map(String::from)
            .collect()
    }
}
