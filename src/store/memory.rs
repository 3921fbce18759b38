use crate::store::{CacheEntry, Store};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory store used by tests and as a fallback when the on-disk
/// keyspace cannot be opened. Contents do not survive the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn read(&self, bucket: &str) -> Option<CacheEntry> {
        let entries = self.inner.read().unwrap();
        let entry = entries.get(bucket).cloned();
        if entry.is_some() {
            debug!("Store HIT for bucket: {bucket}");
        } else {
            debug!("Store MISS for bucket: {bucket}");
        }
        entry
    }

    fn write(&self, bucket: &str, entry: &CacheEntry) {
        let mut entries = self.inner.write().unwrap();
        debug!("Store PUT for bucket: {bucket}");
        entries.insert(bucket.to_string(), entry.clone());
    }
}
