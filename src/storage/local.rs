//! Local filesystem cache store.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── {key}.json            # Written atomically (temp file, then rename)
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::CacheStore;

const ENTRY_EXTENSION: &str = "json";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(format!("{key}.{ENTRY_EXTENSION}"))
    }

    /// Reject keys that would escape the root directory.
    fn check_key(key: &str) -> Result<()> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(AppError::cache(key, "key must be ASCII alphanumeric, '-' or '_'"))
        }
    }

    /// Paths of every stored entry.
    async fn entry_paths(&self) -> Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

#[async_trait]
impl CacheStore for LocalStorage {
    /// Read bytes, returning None if the file doesn't exist.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Self::check_key(key)?;
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        Self::check_key(key)?;
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let path = self.path(key);
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        let paths = self.entry_paths().await?;
        for path in &paths {
            tokio::fs::remove_file(path).await?;
        }
        log::info!("Removed {} cache entries from {}", paths.len(), self.location());
        Ok(paths.len())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entry_paths().await?.len())
    }

    fn location(&self) -> String {
        self.root_dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write("abc123", b"hello").await.unwrap();
        let data = storage.read("abc123").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("abc123.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("not-created-yet"));

        assert!(storage.read("nope").await.unwrap().is_none());
        assert_eq!(storage.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write("k", b"first").await.unwrap();
        storage.write("k", b"second").await.unwrap();
        assert_eq!(storage.read("k").await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(storage.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_only_entries() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        std::fs::write(tmp.path().join("notes.txt"), b"keep me").unwrap();

        storage.write("a", b"1").await.unwrap();
        storage.write("b", b"2").await.unwrap();
        assert_eq!(storage.clear().await.unwrap(), 2);
        assert_eq!(storage.len().await.unwrap(), 0);
        assert!(tmp.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.write("../escape", b"x").await.is_err());
        assert!(storage.read("a/b").await.is_err());
    }
}
