//! Storage abstractions for the page cache.
//!
//! A [`CacheStore`] is a best-effort byte store keyed by strings. The
//! [`PageCache`] adapter on top of it owns serialization and TTL handling.
//!
//! ## Directory Structure
//!
//! ```text
//! cache/
//! ├── 3f1c…e9.json          # One CacheEntry per key (SHA-256 hex)
//! └── a07b…41.json
//! ```

pub mod cache;
pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use cache::{CacheEntry, CacheLookup, CacheStats, MissReason, PageCache, cache_key};
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Trait for cache storage backends.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the bytes stored under `key`, `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `bytes` under `key`, replacing any previous value.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Remove every entry, returning how many were removed.
    async fn clear(&self) -> Result<usize>;

    /// Number of stored entries.
    async fn len(&self) -> Result<usize>;

    /// Human-readable location for diagnostics.
    fn location(&self) -> String;
}
