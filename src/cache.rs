//! Persistent cache for reverse geocoding labels
//!
//! Keys are built from rounded coordinates, so repeated clicks on the same
//! spot hit the cache instead of the rate-limited lookup service.

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use rand::RngExt;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Disk-backed key/value store with per-entry expiry
#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
    ttl: Duration,
}

impl Debug for PersistentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl PersistentCache {
    /// Open (or create) the cache at `path`; entries live for roughly `ttl`
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("reverse_geocode", fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache { store: items, ttl })
    }

    /// Stores a serializable value using the cache TTL with ±10% jitter
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(&self, key: &str, value: T) -> Result<()> {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        let ttl = self.ttl.mul_f64(jitter);
        self.put_with_ttl(key, value, ttl).await
    }

    /// Stores a serializable value with an explicit time-to-live
    pub async fn put_with_ttl<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        if now < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path(), Duration::from_secs(3600)).unwrap();

        cache
            .put("reverse:46.8182:8.2275", "Interlaken, Switzerland".to_string())
            .await
            .unwrap();

        let hit: Option<String> = cache.get("reverse:46.8182:8.2275").await.unwrap();
        assert_eq!(hit.as_deref(), Some("Interlaken, Switzerland"));

        let miss: Option<String> = cache.get("reverse:0:0").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path(), Duration::from_secs(3600)).unwrap();

        cache
            .put_with_ttl("stale", "old label".to_string(), Duration::ZERO)
            .await
            .unwrap();

        let value: Option<String> = cache.get("stale").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_and_remove_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path(), Duration::from_secs(3600)).unwrap();

        cache.put("reverse:45.5202:-122.6742", "Portland".to_string()).await.unwrap();
        cache
            .put("reverse:45.5202:-122.6742", "Portland, Oregon".to_string())
            .await
            .unwrap();
        cache.remove("reverse:0:0").await.unwrap();

        let hit: Option<String> = cache.get("reverse:45.5202:-122.6742").await.unwrap();
        assert_eq!(hit.as_deref(), Some("Portland, Oregon"));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path(), Duration::from_secs(3600)).unwrap();
        cache.put("key", 42_u32).await.unwrap();
        cache.remove("key").await.unwrap();
        assert!(cache.get::<u32>("key").await.unwrap().is_none());
    }
}
