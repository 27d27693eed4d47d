//! Directory-backed blob store.
//!
//! Each blob is one file directly under the root directory. Writes go to a
//! hidden temporary file in the same directory which is then renamed over
//! the target, so readers never observe a partially written blob.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{BlobStore, StoreError, check_key, check_size};
use pacer_core::config::DEFAULT_MAX_BLOB_BYTES;

/// A [`BlobStore`] keeping one file per blob under a root directory.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    max_blob_bytes: usize,
    tmp_counter: AtomicU64,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created on first
    /// write if it does not exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// Overrides the size cap.
    #[must_use]
    pub const fn with_max_blob_bytes(mut self, max_blob_bytes: usize) -> Self {
        self.max_blob_bytes = max_blob_bytes;
        self
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }

    fn tmp_path_for(&self, key: &str) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{key}.tmp.{}.{n}", std::process::id()))
    }

    async fn write_via_tmp(&self, key: &str, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = self.tmp_path_for(key);
        let result = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, path).await
        }
        .await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        result
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        let io_error = |source: std::io::Error| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StoreError::Io {
                    key: key.to_string(),
                    source,
                }
            }
        };

        let metadata = tokio::fs::metadata(&path).await.map_err(io_error)?;
        let len = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        check_size(key, len, self.max_blob_bytes)?;

        let bytes = tokio::fs::read(&path).await.map_err(io_error)?;
        check_size(key, bytes.len(), self.max_blob_bytes)?;
        Ok(bytes)
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        check_size(key, bytes.len(), self.max_blob_bytes)?;
        self.write_via_tmp(key, &path, &bytes)
            .await
            .map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn max_blob_bytes(&self) -> usize {
        self.max_blob_bytes
    }
}
