//! Key-value persistence abstractions.
//!
//! Collections store opaque bytes with an optional time-to-live. Typed access
//! goes through [`get_json`] and [`put_json`].

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    /// Returns `None` for missing or expired keys.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);
    async fn remove(&self, key: &str);
}

/// Named collections, either persisted to disk or held in memory.
pub trait Store: Send + Sync {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;
}

pub async fn get_json<T: DeserializeOwned>(
    collection: &dyn KeyValueCollection,
    key: &str,
) -> Option<T> {
    let bytes = collection.get(key).await?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Discarding undecodable entry for {}: {}", key, e);
            collection.remove(key).await;
            None
        }
    }
}

pub async fn put_json<T: Serialize + Sync>(
    collection: &dyn KeyValueCollection,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec(value)?;
    collection.put(key, bytes, ttl).await;
    Ok(())
}
