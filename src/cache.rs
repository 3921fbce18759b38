//! TTL-based price cache with serve-stale-on-failure degradation

use crate::price_source::PricePayload;
use crate::store::{CacheEntry, Store};
use anyhow::Result;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Serves bucket payloads from the store while they are within their TTL,
/// refreshes on miss, and degrades to whatever was stored before when a
/// refresh fails. Callers only ever see `None` when the upstream call and the
/// stale fallback are both unavailable.
///
/// Concurrent refreshes of a bucket are not coordinated; payloads are
/// idempotent snapshots, so the last writer wins.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn Store>,
}

impl TtlCache {
    pub fn new(store: Arc<dyn Store>) -> Self {
        TtlCache { store }
    }

    /// Direct handle to the underlying store, for out-of-band writes such as
    /// forced refreshes.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub async fn get_or_refresh<F, Fut>(
        &self,
        bucket: &str,
        ttl: Duration,
        fetch: F,
    ) -> Option<PricePayload>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<PricePayload>>>,
    {
        let now = Utc::now().timestamp();
        let stored = self.store.read(bucket);

        if let Some(entry) = &stored {
            if now - entry.timestamp < ttl.as_secs() as i64 {
                debug!("Cache HIT for bucket: {bucket}");
                return Some(entry.data.clone());
            }
        }

        debug!("Cache MISS for bucket: {bucket}, refreshing");
        match fetch().await {
            Ok(Some(data)) => {
                self.store.write(bucket, &CacheEntry::new(now, data.clone()));
                Some(data)
            }
            Ok(None) => {
                warn!("No data from upstream for bucket {bucket}, serving stale if available");
                stored.map(|entry| entry.data)
            }
            Err(e) => {
                warn!("Fetch failed for bucket {bucket}: {e}, serving stale if available");
                stored.map(|entry| entry.data)
            }
        }
    }
}
