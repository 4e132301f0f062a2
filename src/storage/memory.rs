//! In-process cache store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::CacheStore;

/// Cache store held in memory for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|e| AppError::cache("*", format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl CacheStore for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        let mut entries = self.lock()?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_and_clears() {
        let store = MemoryStorage::new();
        store.write("k", b"v").await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.read("k").await.unwrap().is_none());
    }
}
