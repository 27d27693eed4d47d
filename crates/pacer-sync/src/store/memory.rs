//! In-process blob store.
//!
//! Several coordinators can share one `Arc<MemoryBlobStore>` to stand in
//! for clients racing on the same remote object. Every successful write is
//! recorded so tests can inspect exactly what was uploaded.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{BlobStore, StoreError, check_key, check_size};
use pacer_core::config::DEFAULT_MAX_BLOB_BYTES;

#[derive(Debug, Default)]
struct Inner {
    blobs: HashMap<String, Vec<u8>>,
    writes: Vec<(String, Vec<u8>)>,
    fail_next_read: Option<StoreError>,
    fail_next_write: Option<StoreError>,
}

/// A [`BlobStore`] held entirely in memory.
#[derive(Debug)]
pub struct MemoryBlobStore {
    inner: Mutex<Inner>,
    max_blob_bytes: usize,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    /// Creates an empty store with the default size cap.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_blob_bytes(DEFAULT_MAX_BLOB_BYTES)
    }

    /// Creates an empty store with a custom size cap.
    #[must_use]
    pub fn with_max_blob_bytes(max_blob_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_blob_bytes,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seeds `key` without recording a write.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.lock().blobs.insert(key.into(), bytes.into());
    }

    /// Returns a copy of the current content of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().blobs.get(key).cloned()
    }

    /// Returns every successful write, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<(String, Vec<u8>)> {
        self.lock().writes.clone()
    }

    /// Returns the number of successful writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Makes the next read fail with `error`.
    pub fn fail_next_read(&self, error: StoreError) {
        self.lock().fail_next_read = Some(error);
    }

    /// Makes the next write fail with `error`. The stored content is left
    /// untouched.
    pub fn fail_next_write(&self, error: StoreError) {
        self.lock().fail_next_write = Some(error);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        check_key(key)?;
        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_read.take() {
            return Err(error);
        }
        inner
            .blobs
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        check_key(key)?;
        check_size(key, bytes.len(), self.max_blob_bytes)?;
        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_write.take() {
            return Err(error);
        }
        inner.writes.push((key.to_string(), bytes.clone()));
        inner.blobs.insert(key.to_string(), bytes);
        Ok(())
    }

    fn max_blob_bytes(&self) -> usize {
        self.max_blob_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        let err = store.read("members.csv").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_write_replaces_and_records() {
        let store = MemoryBlobStore::new();
        store.write("a.csv", b"one".to_vec()).await.unwrap();
        store.write("a.csv", b"two".to_vec()).await.unwrap();

        assert_eq!(store.read("a.csv").await.unwrap(), b"two");
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.writes()[0], ("a.csv".to_string(), b"one".to_vec()));
    }

    #[tokio::test]
    async fn test_size_cap() {
        let store = MemoryBlobStore::with_max_blob_bytes(4);
        let err = store.write("a.csv", b"12345".to_vec()).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::TooLarge {
                size: 5,
                limit: 4,
                ..
            }
        ));
        assert_eq!(store.get("a.csv"), None);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_injected_faults_fire_once() {
        let store = MemoryBlobStore::new();
        store.insert("a.csv", "data");
        store.fail_next_read(StoreError::Unavailable("offline".to_string()));
        store.fail_next_write(StoreError::Unavailable("offline".to_string()));

        assert!(store.read("a.csv").await.is_err());
        assert_eq!(store.read("a.csv").await.unwrap(), b"data");

        assert!(store.write("a.csv", b"new".to_vec()).await.is_err());
        assert_eq!(store.get("a.csv").unwrap(), b"data");
        store.write("a.csv", b"new".to_vec()).await.unwrap();
        assert_eq!(store.get("a.csv").unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_rejects_path_keys() {
        let store = MemoryBlobStore::new();
        let err = store.write("../escape", Vec::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }
}
