//! # pacer-sync
//!
//! Keeps a [`pacer_core::Workspace`] in step with a shared [`BlobStore`].
//!
//! - [`store`]: the storage boundary plus in-memory and directory-backed
//!   implementations
//! - [`SyncCoordinator`]: pull, mutate, push, with last-writer-wins at
//!   whole-collection granularity
//! - [`spawn_periodic_sync`]: re-syncs on a fixed interval

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod coordinator;
pub mod periodic;
pub mod store;

pub use coordinator::{
    PullSummary, PushSummary, SyncCoordinator, SyncError, SyncSettings, SyncSummary,
};
pub use periodic::spawn_periodic_sync;
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore, StoreError};
