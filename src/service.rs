//! Dataset service composing fetch, normalize, and cache
//!
//! One `DataService` owns the HTTP client, the TTL cache, and the mapping
//! from logical dataset keys ("primary", "ads") to spreadsheet source ids.
//! It is constructed once at startup and shared by reference with the
//! request handlers; there is no module-level cache state.

use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::ads::{format_ads, Ad, AdAliases};
use crate::cache::{CacheStatus, TtlCache};
use crate::config::Config;
use crate::data::{normalize, Dataset, FetchError, ParseError, SheetFetcher};

/// Key of the primary dataset
pub const PRIMARY_DATASET: &str = "primary";

/// Key of the ads dataset
pub const ADS_DATASET: &str = "ads";

/// Errors surfaced by dataset operations
///
/// Fetch and parse failures propagate verbatim from the lower layers; the
/// only error added at this level is a lookup of a dataset key that has no
/// configured source.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no source configured for dataset '{0}'")]
    UnknownDataset(String),
}

/// Cache-aware access to the configured datasets
pub struct DataService {
    fetcher: SheetFetcher,
    cache: TtlCache<Dataset>,
    /// dataset key -> spreadsheet source id
    sources: HashMap<String, String>,
    ad_aliases: AdAliases,
}

impl DataService {
    /// Builds the service from deployment configuration.
    pub fn new(config: &Config) -> Self {
        let mut sources = HashMap::new();
        sources.insert(PRIMARY_DATASET.to_string(), config.sheet_id.clone());
        sources.insert(ADS_DATASET.to_string(), config.ads_source());
        Self::with_fetcher(
            SheetFetcher::new(),
            Duration::seconds(config.cache_ttl_secs as i64),
            sources,
        )
    }

    /// Builds the service with an explicit fetcher (used by tests to point at
    /// a stub export server) and source map.
    pub fn with_fetcher(
        fetcher: SheetFetcher,
        ttl: Duration,
        sources: HashMap<String, String>,
    ) -> Self {
        Self {
            fetcher,
            cache: TtlCache::new(ttl),
            sources,
            ad_aliases: AdAliases::default(),
        }
    }

    fn source(&self, key: &str) -> Result<&str, ServiceError> {
        self.sources
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ServiceError::UnknownDataset(key.to_string()))
    }

    /// The expensive path: fetch the export and normalize it into a Dataset.
    async fn produce(&self, key: &str) -> Result<Dataset, ServiceError> {
        let source = self.source(key)?;
        let bytes = self.fetcher.fetch(source).await?;
        let (fields, records) = normalize(&bytes)?;
        info!(key, records = records.len(), "dataset normalized");
        Ok(Dataset::new(fields, records))
    }

    /// Returns the dataset for a key, fetching only when the cached copy is
    /// absent or stale.
    pub async fn get_data(&self, key: &str) -> Result<Arc<Dataset>, ServiceError> {
        self.source(key)?;
        self.cache
            .get_or_populate(key, || self.produce(key))
            .await
    }

    /// Re-fetches the dataset unconditionally and replaces the cached copy.
    pub async fn refresh(&self, key: &str) -> Result<Arc<Dataset>, ServiceError> {
        self.source(key)?;
        self.cache
            .force_populate(key, || self.produce(key))
            .await
    }

    /// Projects a single column from the (possibly cached) dataset, dropping
    /// records where the field is blank or absent.
    pub async fn get_field(&self, key: &str, field: &str) -> Result<Vec<String>, ServiceError> {
        let dataset = self.get_data(key).await?;
        Ok(dataset.project_field(field))
    }

    /// Cache introspection for the health endpoint; never triggers a fetch.
    pub async fn status(&self, key: &str) -> CacheStatus {
        self.cache.status(key).await
    }

    /// The ads dataset formatted through the alias table.
    pub async fn ads(&self) -> Result<Vec<Ad>, ServiceError> {
        let dataset = self.get_data(ADS_DATASET).await?;
        Ok(format_ads(&dataset, &self.ad_aliases))
    }
}
