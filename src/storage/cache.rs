//! TTL page cache adapter.
//!
//! Maps a url + depth + policy key to the last stored [`PageRecord`]. Lookups
//! never fail: a missing, expired, undecodable or unreadable entry is a miss
//! with a reason, and the caller fetches live.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::{DomainPolicy, PageRecord};
use crate::storage::CacheStore;

/// Default entry lifetime: 24 hours.
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Derive the cache key for a page fetched at `depth` under `policy`.
pub fn cache_key(url: &str, depth: usize, policy: &DomainPolicy) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}", url, depth, policy.fingerprint()).as_bytes());
    hex::encode(hasher.finalize())
}

/// Envelope persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: PageRecord,
    pub stored_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    /// Expired once older than its TTL. A timestamp in the future (clock
    /// skew) also counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now - self.stored_at;
        let ttl = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        age < Duration::zero() || age > ttl
    }
}

/// Why a lookup did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    Missing,
    Expired,
    /// Bytes were present but could not be decoded
    Corrupted(String),
    /// The store itself failed
    Unavailable(String),
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(PageRecord),
    Miss(MissReason),
}

impl CacheLookup {
    pub fn into_record(self) -> Option<PageRecord> {
        match self {
            CacheLookup::Hit(record) => Some(record),
            CacheLookup::Miss(_) => None,
        }
    }
}

/// Entry count and location of a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub location: String,
    pub ttl_seconds: u64,
}

/// Page cache over any [`CacheStore`].
#[derive(Clone)]
pub struct PageCache {
    store: Arc<dyn CacheStore>,
    ttl_seconds: u64,
}

impl PageCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL_SECS)
    }

    pub fn with_ttl(store: Arc<dyn CacheStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Look up `key` against the current time.
    pub async fn lookup(&self, key: &str) -> CacheLookup {
        self.lookup_at(key, Utc::now()).await
    }

    /// Look up `key` as of `now`.
    pub async fn lookup_at(&self, key: &str, now: DateTime<Utc>) -> CacheLookup {
        let bytes = match self.store.read(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return CacheLookup::Miss(MissReason::Missing),
            Err(e) => {
                log::warn!("Cache unavailable for {}: {}", key, e);
                return CacheLookup::Miss(MissReason::Unavailable(e.to_string()));
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Corrupted cache entry {}: {}", key, e);
                return CacheLookup::Miss(MissReason::Corrupted(e.to_string()));
            }
        };

        if entry.key != key {
            return CacheLookup::Miss(MissReason::Corrupted(format!(
                "entry belongs to key {}",
                entry.key
            )));
        }
        if entry.is_expired(now) {
            log::debug!("Cache entry {} expired (stored {})", key, entry.stored_at);
            return CacheLookup::Miss(MissReason::Expired);
        }

        CacheLookup::Hit(entry.value)
    }

    /// The cached record for `key`, if present and fresh.
    pub async fn get(&self, key: &str) -> Option<PageRecord> {
        self.lookup(key).await.into_record()
    }

    /// Store `record` under `key`, overwriting any previous entry.
    pub async fn put(&self, key: &str, record: &PageRecord) -> Result<()> {
        self.put_at(key, record, Utc::now()).await
    }

    /// Store `record` under `key`, stamped with `now`.
    pub async fn put_at(&self, key: &str, record: &PageRecord, now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry {
            key: key.to_string(),
            value: record.clone(),
            stored_at: now,
            ttl_seconds: self.ttl_seconds,
        };
        let bytes = serde_json::to_vec(&entry)?;
        self.store
            .write(key, &bytes)
            .await
            .map_err(|e| AppError::cache(key, e))
    }

    /// Raw entry for `key`, bypassing the TTL check.
    pub async fn entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        match self.store.read(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            entries: self.store.len().await?,
            location: self.store.location(),
            ttl_seconds: self.ttl_seconds,
        })
    }

    /// Remove all entries.
    pub async fn clear(&self) -> Result<usize> {
        self.store.clear().await
    }
}
