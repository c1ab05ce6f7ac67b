//! Result cache for ranked search responses.
//!
//! Entries are keyed by a SHA-256 digest of the normalised query and the
//! sorted set of enabled sources, and hold the final ranked record list.
//! The backing store is pluggable through [`CacheStore`]; the default is an
//! in-process [`moka`] map. Any store error degrades to a miss (on read) or
//! a logged no-op (on write); the cache never fails a search.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::types::{hex, Record};

/// A key-value store with per-entry TTL.
///
/// Implementations may be in-memory or networked. Values are treated as
/// immutable once written: a second `set` for the same key overwrites.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key` for at most `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

#[derive(Debug)]
struct StoredValue {
    payload: String,
    expires_at: Instant,
}

/// In-process store backed by a bounded [`moka`] cache.
///
/// Expiry is checked lazily on read; stale entries are only evicted when
/// looked up or pushed out by capacity.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Cache<String, Arc<StoredValue>>,
}

impl MemoryStore {
    /// Create a store holding at most `max_entries` values.
    pub fn new(max_entries: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_entries).build(),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(value) = self.inner.get(key).await else {
            return Ok(None);
        };
        if Instant::now() >= value.expires_at {
            self.inner.invalidate(key).await;
            return Ok(None);
        }
        Ok(Some(value.payload.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let stored = StoredValue {
            payload: value,
            expires_at: Instant::now() + ttl,
        };
        self.inner.insert(key.to_owned(), Arc::new(stored)).await;
        Ok(())
    }
}

/// Serialised form of a cached result set.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    digest: String,
    created_at: DateTime<Utc>,
    items: Vec<Record>,
}

/// Lower-cased, whitespace-collapsed query text.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic cache key for a query and source set.
///
/// Source order does not matter: `[bing, wikipedia]` and
/// `[wikipedia, bing]` produce the same key.
pub fn cache_key(query: &str, sources: &[String]) -> String {
    let mut sorted: Vec<&str> = sources.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut hasher = Sha256::new();
    hasher.update(normalize_query(query).as_bytes());
    hasher.update(b"|");
    hasher.update(sorted.join(",").as_bytes());
    hex(&hasher.finalize())
}

/// Best-effort cache of ranked results in front of the orchestrator.
#[derive(Clone)]
pub struct ResultCache {
    store: Option<Arc<dyn CacheStore>>,
    ttl_override: Option<Duration>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("enabled", &self.is_enabled())
            .field("ttl_override", &self.ttl_override)
            .finish()
    }
}

impl ResultCache {
    /// Cache over an arbitrary store.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store: Some(store),
            ttl_override: None,
        }
    }

    /// A cache that never hits and never stores.
    pub fn disabled() -> Self {
        Self {
            store: None,
            ttl_override: None,
        }
    }

    /// In-process cache configured from `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            store: Some(Arc::new(MemoryStore::new(config.max_entries))),
            ttl_override: config.ttl_override_secs.map(Duration::from_secs),
        }
    }

    /// Replace the backing store, keeping the TTL override.
    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Whether a backing store is present.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Look up a fresh ranked list for `(query, sources)`.
    ///
    /// Store errors and undecodable payloads are logged and reported as a miss.
    pub async fn get(&self, query: &str, sources: &[String]) -> Option<Vec<Record>> {
        let store = self.store.as_ref()?;
        let key = cache_key(query, sources);

        let payload = match store.get(&key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&payload) {
            Ok(entry) if entry.digest == key => {
                tracing::debug!(items = entry.items.len(), "cache hit");
                Some(entry.items)
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(error = %err, "cached entry could not be decoded");
                None
            }
        }
    }

    /// Store a ranked list for `(query, sources)`.
    ///
    /// `ttl` is the volatility-derived lifetime; a configured override
    /// replaces it. Failures are logged only.
    pub async fn put(&self, query: &str, sources: &[String], items: &[Record], ttl: Duration) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let key = cache_key(query, sources);
        let ttl = self.ttl_override.unwrap_or(ttl);

        let entry = CacheEntry {
            digest: key.clone(),
            created_at: Utc::now(),
            items: items.to_vec(),
        };
        let payload = match serde_json::to_string(&entry) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(error = %err, "cache entry not serialisable");
                return;
            }
        };

        if let Err(err) = store.set(&key, payload, ttl).await {
            tracing::warn!(error = %err, "cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(SearchError::Cache("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
            Err(SearchError::Cache("connection refused".into()))
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    fn sample() -> Vec<Record> {
        vec![Record::new("Cached", "A cached result", "https://cached.com", "bing")]
    }

    #[test]
    fn key_deterministic_for_same_inputs() {
        let a = cache_key("rust programming", &names(&["bing", "wikipedia"]));
        let b = cache_key("rust programming", &names(&["bing", "wikipedia"]));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn key_same_for_reordered_sources() {
        let a = cache_key("test", &names(&["wikipedia", "bing"]));
        let b = cache_key("test", &names(&["bing", "wikipedia"]));
        assert_eq!(a, b);
    }

    #[test]
    fn key_normalises_case_and_whitespace() {
        let a = cache_key("  RUST   Programming ", &names(&["bing"]));
        let b = cache_key("rust programming", &names(&["bing"]));
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_when_source_set_differs() {
        let a = cache_key("test", &names(&["bing"]));
        let b = cache_key("test", &names(&["duckduckgo"]));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = ResultCache::from_config(&CacheConfig::default());
        let sources = names(&["bing"]);
        assert!(cache.get("cache miss", &sources).await.is_none());

        cache
            .put("cache miss", &sources, &sample(), Duration::from_secs(600))
            .await;
        let hit = cache.get("Cache  MISS", &sources).await.expect("cached");
        assert_eq!(hit, sample());
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let cache = ResultCache::from_config(&CacheConfig::default());
        let sources = names(&["bing"]);
        cache.put("q", &sources, &sample(), Duration::from_secs(600)).await;
        let newer = vec![Record::new("New", "n", "https://new.com", "bing")];
        cache.put("q", &sources, &newer, Duration::from_secs(600)).await;
        let hit = cache.get("q", &sources).await.expect("cached");
        assert_eq!(hit[0].title, "New");
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_a_miss() {
        let cache = ResultCache::from_config(&CacheConfig::default());
        let sources = names(&["bing"]);
        cache.put("q", &sources, &sample(), Duration::from_secs(60)).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get("q", &sources).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_override_wins() {
        let config = CacheConfig {
            ttl_override_secs: Some(5),
            ..Default::default()
        };
        let cache = ResultCache::from_config(&config);
        let sources = names(&["bing"]);
        cache.put("q", &sources, &sample(), Duration::from_secs(3600)).await;
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(cache.get("q", &sources).await.is_none());
    }

    #[tokio::test]
    async fn broken_store_degrades_to_miss() {
        let cache = ResultCache::new(Arc::new(BrokenStore));
        let sources = names(&["bing"]);
        cache.put("q", &sources, &sample(), Duration::from_secs(60)).await;
        assert!(cache.get("q", &sources).await.is_none());
    }

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache = ResultCache::from_config(&CacheConfig {
            enabled: false,
            ..Default::default()
        });
        assert!(!cache.is_enabled());
        let sources = names(&["bing"]);
        cache.put("q", &sources, &sample(), Duration::from_secs(60)).await;
        assert!(cache.get("q", &sources).await.is_none());
    }
}
