use crate::store::{CacheEntry, Store};
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

const BUCKETS_PARTITION: &str = "buckets";

/// Persistent store backed by a fjall keyspace. Each bucket key maps to one
/// JSON-encoded `CacheEntry`; single-key inserts are atomic, so readers never
/// observe a torn entry.
pub struct DiskStore {
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open cache store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(BUCKETS_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open cache partition")?;
        Ok(DiskStore {
            _keyspace: keyspace,
            partition,
        })
    }
}

impl Store for DiskStore {
    fn read(&self, bucket: &str) -> Option<CacheEntry> {
        let res: Result<Option<CacheEntry>> = (|| {
            let Some(raw) = self.partition.get(bucket)? else {
                debug!("Store MISS for bucket: {bucket}");
                return Ok(None);
            };
            let entry: CacheEntry = serde_json::from_slice(&raw)?;
            debug!("Store HIT for bucket: {bucket}");
            Ok(Some(entry))
        })();

        match res {
            Ok(entry) => entry,
            Err(e) => {
                debug!("DiskStore read error for bucket {bucket}: {e}");
                None
            }
        }
    }

    fn write(&self, bucket: &str, entry: &CacheEntry) {
        let res: Result<()> = (|| {
            let raw = serde_json::to_vec(entry)?;
            self.partition.insert(bucket, raw)?;
            debug!("Store PUT for bucket: {bucket}");
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskStore write error for bucket {bucket}: {e}");
        }
    }
}
