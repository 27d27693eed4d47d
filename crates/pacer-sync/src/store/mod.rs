//! The shared blob store boundary.
//!
//! A store holds named blobs. Reading returns the full content or
//! [`StoreError::NotFound`]; writing replaces the full content. There is no
//! versioning, locking, or conditional write: the last write wins.

mod fs;
mod memory;

use async_trait::async_trait;
use pacer_core::config::DEFAULT_MAX_BLOB_BYTES;
use thiserror::Error;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

/// Errors surfaced by a [`BlobStore`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No blob exists under the key.
    #[error("blob not found: {key}")]
    NotFound {
        /// The requested key.
        key: String,
    },

    /// The blob exceeds the store's size cap.
    #[error("blob {key} is {size} bytes, exceeding the {limit} byte cap")]
    TooLarge {
        /// The blob key.
        key: String,
        /// Actual size in bytes.
        size: usize,
        /// Configured cap in bytes.
        limit: usize,
    },

    /// The key cannot name a blob.
    #[error("invalid blob key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// Underlying I/O failure.
    #[error("i/o error on blob {key}: {source}")]
    Io {
        /// The blob key.
        key: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A remote location holding whole-content blobs.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Reads the full content of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if nothing has been written under
    /// `key`, or another variant if the read fails.
    async fn read(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Replaces the full content of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TooLarge`] if `bytes` exceeds
    /// [`Self::max_blob_bytes`], or another variant if the write fails. A
    /// failed write leaves the previous content in place.
    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Size cap applied to each blob.
    fn max_blob_bytes(&self) -> usize {
        DEFAULT_MAX_BLOB_BYTES
    }
}

pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    if pacer_core::config::is_valid_blob_key(key) {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        })
    }
}

pub(crate) fn check_size(key: &str, size: usize, limit: usize) -> Result<(), StoreError> {
    if size > limit {
        return Err(StoreError::TooLarge {
            key: key.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}
