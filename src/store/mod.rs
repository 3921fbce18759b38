pub mod disk;
pub mod memory;

use crate::price_source::PricePayload;
use serde::{Deserialize, Serialize};

/// One bucket's price snapshot together with its fetch time.
///
/// Entries are written whole; a reader never observes a partial payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub timestamp: i64,
    pub data: PricePayload,
}

impl CacheEntry {
    pub fn new(timestamp: i64, data: PricePayload) -> Self {
        CacheEntry { timestamp, data }
    }
}

/// A key-value store holding one `CacheEntry` per bucket key.
///
/// Reads and writes cover the whole value; writes for a key are atomic.
pub trait Store: Send + Sync {
    fn read(&self, bucket: &str) -> Option<CacheEntry>;
    fn write(&self, bucket: &str, entry: &CacheEntry);
}
