//! Remote spreadsheet export client
//!
//! Fetches the raw xlsx export of a Google Sheet as a byte buffer. This
//! module performs no parsing and no caching; it only translates transport
//! and status failures into `FetchError`.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Request timeout for the export download. The cache imposes no timeout of
/// its own, so this is the only deadline in the pipeline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default base URL for Google Sheets document exports
const DEFAULT_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Errors that can occur when downloading a spreadsheet export
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request failed (connection, DNS, timeout, body read)
    #[error("spreadsheet export request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status
    #[error("spreadsheet export for '{sheet_id}' returned status {status}")]
    Status {
        sheet_id: String,
        status: StatusCode,
    },
}

/// Client for downloading spreadsheet exports
///
/// No retry policy is applied here; a caller that wants to retry a failed
/// fetch does so explicitly (e.g. by issuing another refresh).
#[derive(Debug, Clone)]
pub struct SheetFetcher {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the export endpoint (overridable for testing)
    base_url: String,
}

impl SheetFetcher {
    /// Creates a new SheetFetcher against the Google Sheets export endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Creates a new SheetFetcher with a custom base URL (used by tests to
    /// point at a local stub server).
    pub fn with_base_url(base_url: String) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            http_client,
            base_url,
        }
    }

    /// Builds the xlsx export URL for a sheet id.
    fn export_url(&self, sheet_id: &str) -> String {
        format!(
            "{}/{}/export?format=xlsx&id={}",
            self.base_url, sheet_id, sheet_id
        )
    }

    /// Downloads the full export body for the given sheet id.
    ///
    /// Returns the raw bytes of the response; parsing is the normalizer's
    /// job. A non-2xx response becomes `FetchError::Status` carrying the
    /// upstream status for diagnostic surfacing.
    pub async fn fetch(&self, sheet_id: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.export_url(sheet_id);
        debug!(sheet_id, "fetching spreadsheet export");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                sheet_id: sheet_id.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await?;
        debug!(sheet_id, bytes = bytes.len(), "export downloaded");
        Ok(bytes.to_vec())
    }
}

impl Default for SheetFetcher {
    fn default() -> Self {
        Self::new()
    }
}
