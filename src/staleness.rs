//! Staleness reporting, decoupled from the refresh path

use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Answers "has this bucket's data outlived its TTL?" from stored state
/// alone. Performs no network I/O and never mutates the cache, so it can
/// report on buckets the refresh path never touched.
#[derive(Clone)]
pub struct StalenessOracle {
    store: Arc<dyn Store>,
}

impl StalenessOracle {
    pub fn new(store: Arc<dyn Store>) -> Self {
        StalenessOracle { store }
    }

    pub fn is_stale(&self, bucket: &str, ttl: Duration) -> bool {
        match self.store.read(bucket) {
            Some(entry) => Utc::now().timestamp() - entry.timestamp >= ttl.as_secs() as i64,
            None => true,
        }
    }
}
