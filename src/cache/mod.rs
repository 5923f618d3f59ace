//! In-memory TTL cache for normalized datasets
//!
//! Provides a `TtlCache` that holds at most one value per logical key, tagged
//! with its fetch timestamp. Expiry is evaluated lazily at access time; there
//! is no background eviction and no sliding expiry. Population is
//! single-flight per key: concurrent callers that observe a miss await the
//! one in-flight producer instead of issuing redundant fetches, while callers
//! for different keys proceed fully in parallel.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// A populated cache entry: the value plus when it was fetched
struct Entry<T> {
    value: Arc<T>,
    fetched_at: DateTime<Utc>,
}

/// Per-key state: the current entry and the single-flight population guard
struct Slot<T> {
    /// Last-known-good value, if any. Read locks never wait on an in-flight
    /// population, so `status` stays non-blocking.
    value: RwLock<Option<Entry<T>>>,
    /// Held for the duration of a population; serializes producers per key
    flight: Mutex<()>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: RwLock::new(None),
            flight: Mutex::new(()),
        }
    }
}

/// Read-only cache introspection for health reporting
///
/// Before the first successful fetch all fields are `false`/`None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    /// Whether a value is currently cached for the key
    pub is_cached: bool,
    /// When the cached value was fetched
    pub last_update: Option<DateTime<Utc>>,
    /// Milliseconds until the entry goes stale, clamped at 0 once expired
    pub time_to_expiry: Option<i64>,
}

/// Single-slot-per-key cache with a fixed time-to-live
///
/// The cache exclusively owns the last-known-good value for each key; callers
/// receive `Arc` clones, never a handle that can mutate the cached copy. A
/// failed producer leaves any existing (possibly stale) entry untouched and
/// propagates its error; falling back to stale data is the caller's decision,
/// never the cache's.
pub struct TtlCache<T> {
    /// How long an entry is considered fresh
    ttl: Duration,
    /// One slot per dataset key, created lazily on first access
    slots: Mutex<HashMap<String, Arc<Slot<T>>>>,
}

impl<T> TtlCache<T> {
    /// Creates an empty cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the slot for a key, creating it if this is the first access.
    async fn slot(&self, key: &str) -> Arc<Slot<T>> {
        let mut slots = self.slots.lock().await;
        slots.entry(key.to_string()).or_default().clone()
    }

    fn is_fresh(&self, entry: &Entry<T>) -> bool {
        Utc::now() - entry.fetched_at < self.ttl
    }

    /// Returns the cached value if present and fresh; otherwise runs
    /// `producer`, stores its result with the current timestamp, and returns
    /// it.
    ///
    /// On a miss the first caller holds the per-key flight guard while the
    /// producer runs; concurrent callers for the same key re-check the slot
    /// after acquiring the guard and reuse the fresh result instead of
    /// producing again.
    pub async fn get_or_populate<F, Fut, E>(&self, key: &str, producer: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let slot = self.slot(key).await;

        if let Some(entry) = slot.value.read().await.as_ref() {
            if self.is_fresh(entry) {
                return Ok(entry.value.clone());
            }
        }

        let _flight = slot.flight.lock().await;

        // Re-check: another caller may have finished populating while we
        // waited on the flight guard.
        if let Some(entry) = slot.value.read().await.as_ref() {
            if self.is_fresh(entry) {
                return Ok(entry.value.clone());
            }
        }

        debug!(key, "cache miss, invoking producer");
        let value = Arc::new(producer().await?);
        let mut guard = slot.value.write().await;
        *guard = Some(Entry {
            value: value.clone(),
            fetched_at: Utc::now(),
        });
        Ok(value)
    }

    /// Runs `producer` unconditionally, overwrites the entry wholesale, and
    /// returns the new value. Used for explicit refresh requests; still
    /// serialized against other populations of the same key.
    pub async fn force_populate<F, Fut, E>(&self, key: &str, producer: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let slot = self.slot(key).await;
        let _flight = slot.flight.lock().await;

        debug!(key, "forced population");
        let value = Arc::new(producer().await?);
        let mut guard = slot.value.write().await;
        *guard = Some(Entry {
            value: value.clone(),
            fetched_at: Utc::now(),
        });
        Ok(value)
    }

    /// Reports whether a value is cached for the key and how long it has
    /// left. Never triggers a fetch and never waits on one in flight.
    pub async fn status(&self, key: &str) -> CacheStatus {
        let slot = self.slot(key).await;
        let guard = slot.value.read().await;
        match guard.as_ref() {
            None => CacheStatus {
                is_cached: false,
                last_update: None,
                time_to_expiry: None,
            },
            Some(entry) => {
                let remaining = self.ttl - (Utc::now() - entry.fetched_at);
                CacheStatus {
                    is_cached: true,
                    last_update: Some(entry.fetched_at),
                    time_to_expiry: Some(remaining.num_milliseconds().max(0)),
                }
            }
        }
    }
}
