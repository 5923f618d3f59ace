//! Configuration parsing for Sheetserve
//!
//! All knobs are fixed deployment configuration, not user input: the listen
//! port, the spreadsheet source identifiers, and the cache time-to-live.
//! Every flag also has an environment-variable fallback so the server can be
//! configured without arguments.

use clap::Parser;

/// Default primary spreadsheet id (the public export this service fronts)
const DEFAULT_SHEET_ID: &str = "15Sh8QPFF_r-oY9qtUPiSPpDBQlhXtn_y";

/// Sheetserve - serve a Google Sheet as a JSON API with a TTL cache
#[derive(Parser, Debug, Clone)]
#[command(name = "sheetserve")]
#[command(about = "Serve normalized Google Sheets data over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Google Sheets id of the primary dataset
    #[arg(long, env = "SHEET_ID", default_value = DEFAULT_SHEET_ID)]
    pub sheet_id: String,

    /// Google Sheets id of the ads dataset (defaults to the primary sheet)
    #[arg(long, env = "ADS_SHEET_ID")]
    pub ads_sheet_id: Option<String>,

    /// How long a fetched dataset stays fresh, in seconds
    #[arg(long, env = "CACHE_TTL_SECS", default_value_t = 300)]
    pub cache_ttl_secs: u64,
}

impl Config {
    /// The ads source id, falling back to the primary sheet when none is
    /// configured so both endpoints work against a single spreadsheet.
    pub fn ads_source(&self) -> String {
        self.ads_sheet_id
            .clone()
            .unwrap_or_else(|| self.sheet_id.clone())
    }
}
