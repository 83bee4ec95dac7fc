use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<SystemTime>,
}

/// Collection backed by a fjall partition.
pub struct DiskCollection {
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(partition: PartitionHandle) -> Self {
        Self { partition }
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(raw) = self.partition.get(key.as_bytes())? else {
            debug!("Cache MISS for key: {}", key);
            return Ok(None);
        };
        let entry: CacheEntry = serde_json::from_slice(&raw)?;
        if entry
            .expires_at
            .is_some_and(|expires_at| SystemTime::now() > expires_at)
        {
            debug!("Cache entry expired for key: {}", key);
            self.partition.remove(key.as_bytes())?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        let bytes = serde_json::to_vec(&entry)?;
        self.partition.insert(key.as_bytes(), bytes.as_slice())?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        if let Err(e) = self.write(key, value, ttl) {
            debug!("DiskCollection put error: {}", e);
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.partition.remove(key.as_bytes()) {
            debug!("DiskCollection remove error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn open(path: &std::path::Path) -> DiskCollection {
        let keyspace = fjall::Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(partition)
    }

    #[tokio::test]
    async fn test_disk_collection_get_put() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        assert!(collection.get("key1").await.is_none());
        collection.put("key1", b"123".to_vec(), None).await;
        assert_eq!(collection.get("key1").await, Some(b"123".to_vec()));
    }

    #[tokio::test]
    async fn test_disk_collection_ttl_expiration() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection
            .put("key1", b"123".to_vec(), Some(Duration::from_millis(10)))
            .await;
        assert_eq!(collection.get("key1").await, Some(b"123".to_vec()));

        sleep(Duration::from_millis(20)).await;
        assert!(collection.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_collection_remove() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection.put("key1", b"123".to_vec(), None).await;
        collection.remove("key1").await;
        assert!(collection.get("key1").await.is_none());
    }
}
