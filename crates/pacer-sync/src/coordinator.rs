//! Reconciles a client's in-memory workspace with the shared store.
//!
//! # Consistency
//!
//! The store holds exactly two blobs: the membership roster and the full
//! activity collection of every team. A push always encodes and uploads
//! the *entire* in-memory activity set; there are no deltas, no row-level
//! merge and no version check. Two clients that pull, mutate and push
//! concurrently race, and the later upload replaces the earlier one in
//! full.
//!
//! # Failure
//!
//! - A failed pull leaves the workspace exactly as it was.
//! - A failed push keeps the local mutations and leaves them pending, so
//!   the next [`SyncCoordinator::sync`] retries the upload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pacer_core::codec::{self, SkippedRow};
use pacer_core::config::StoreConfig;
use pacer_core::{Activity, ActivityId, Clock, LifecycleError, TeamMember, Transition, Workspace};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{BlobStore, StoreError};

/// Blob keys used by a coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Key of the membership blob.
    pub members_blob: String,
    /// Key of the activity blob.
    pub activities_blob: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

impl SyncSettings {
    /// Takes the blob keys from a store configuration.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            members_blob: config.members_blob.clone(),
            activities_blob: config.activities_blob.clone(),
        }
    }
}

/// Errors returned by sync operations.
///
/// Whatever the variant, the in-memory workspace is unchanged by the
/// failed operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A downloaded blob is not valid UTF-8.
    #[error("blob {key} is not valid UTF-8: {source}")]
    InvalidEncoding {
        /// The blob key.
        key: String,
        /// The decoding failure.
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The encoded payload exceeds the store's size cap.
    #[error("encoded {key} is {size} bytes, exceeding the {limit} byte cap")]
    PayloadTooLarge {
        /// The blob key.
        key: String,
        /// Encoded size in bytes.
        size: usize,
        /// Store cap in bytes.
        limit: usize,
    },
}

/// What a successful pull loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullSummary {
    /// Teams assembled.
    pub teams: usize,
    /// Members across all teams.
    pub members: usize,
    /// Activities placed on a team.
    pub activities: usize,
    /// Membership rows that could not be decoded.
    pub skipped_members: Vec<SkippedRow>,
    /// Activity rows that could not be decoded.
    pub skipped_activities: Vec<SkippedRow>,
}

impl PullSummary {
    /// Total number of skipped rows across both blobs.
    #[must_use]
    pub fn skipped_rows(&self) -> usize {
        self.skipped_members.len() + self.skipped_activities.len()
    }
}

/// What a successful push uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushSummary {
    /// Records in the uploaded payload.
    pub records: usize,
    /// Payload size in bytes.
    pub bytes: usize,
}

/// Result of [`SyncCoordinator::sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// The upload performed first, if local changes were pending.
    pub pushed: Option<PushSummary>,
    /// The download that followed.
    pub pulled: PullSummary,
}

/// Owns one client's workspace and moves it to and from a [`BlobStore`].
///
/// Mutations never suspend; only [`pull`](Self::pull),
/// [`push`](Self::push), [`sync`](Self::sync) and
/// [`publish_roster`](Self::publish_roster) touch the store. The
/// coordinator is not internally locked; share it behind a
/// `tokio::sync::Mutex` when a background task also syncs it.
#[derive(Debug)]
pub struct SyncCoordinator {
    store: Arc<dyn BlobStore>,
    settings: SyncSettings,
    clock: Arc<dyn Clock>,
    workspace: Workspace,
    pending_upload: bool,
    last_pull_at: Option<DateTime<Utc>>,
    last_push_at: Option<DateTime<Utc>>,
}

impl SyncCoordinator {
    /// Creates a coordinator with an empty workspace.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>, settings: SyncSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            settings,
            clock,
            workspace: Workspace::new(),
            pending_upload: false,
            last_pull_at: None,
            last_push_at: None,
        }
    }

    /// Returns the in-memory workspace.
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Returns the blob keys in use.
    #[must_use]
    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Returns the injected clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns `true` if local changes have not been uploaded yet.
    #[must_use]
    pub const fn has_pending_upload(&self) -> bool {
        self.pending_upload
    }

    /// When the last successful pull finished.
    #[must_use]
    pub const fn last_pull_at(&self) -> Option<DateTime<Utc>> {
        self.last_pull_at
    }

    /// When the last successful push finished.
    #[must_use]
    pub const fn last_push_at(&self) -> Option<DateTime<Utc>> {
        self.last_push_at
    }

    /// Runs `f` against the workspace and marks the activity set as
    /// pending upload.
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut Workspace) -> R) -> R {
        let result = f(&mut self.workspace);
        self.pending_upload = true;
        result
    }

    /// Applies a lifecycle transition stamped with the coordinator's clock.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] if the activity does not exist or its
    /// status does not permit the transition. Nothing is marked pending in
    /// that case.
    pub fn transition(
        &mut self,
        id: ActivityId,
        transition: Transition,
    ) -> Result<&Activity, LifecycleError> {
        let now = self.clock.now();
        let activity = self.workspace.apply(id, transition, now)?;
        self.pending_upload = true;
        Ok(activity)
    }

    /// Downloads both blobs and replaces the workspace with their contents.
    ///
    /// A missing blob reads as an empty collection. Rows that fail to
    /// decode are skipped and reported in the summary. Local changes that
    /// were not pushed are discarded; use [`sync`](Self::sync) to upload
    /// them first.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if either download fails or a blob is not
    /// UTF-8. The workspace is left untouched.
    pub async fn pull(&mut self) -> Result<PullSummary, SyncError> {
        let members_text = self.read_text(&self.settings.members_blob).await?;
        let activities_text = self.read_text(&self.settings.activities_blob).await?;

        let roster = codec::decode_roster(&members_text);
        let members: Vec<TeamMember> = roster.records.iter().map(|e| e.member.clone()).collect();
        let activities = codec::decode_activities(&activities_text, &members);
        let workspace = Workspace::assemble(roster.records, activities.records);

        let summary = PullSummary {
            teams: workspace.teams().len(),
            members: members.len(),
            activities: workspace.activity_count(),
            skipped_members: roster.skipped,
            skipped_activities: activities.skipped,
        };

        self.workspace = workspace;
        self.pending_upload = false;
        self.last_pull_at = Some(self.clock.now());
        info!(
            teams = summary.teams,
            members = summary.members,
            activities = summary.activities,
            skipped = summary.skipped_rows(),
            "pulled workspace"
        );
        Ok(summary)
    }

    /// Encodes every activity of every team and overwrites the activity
    /// blob with the result.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the payload exceeds the store's cap or the
    /// upload fails. The local changes stay pending.
    pub async fn push(&mut self) -> Result<PushSummary, SyncError> {
        let text = codec::encode_activities(self.workspace.activities(), self.workspace.members());
        let summary = PushSummary {
            records: self.workspace.activity_count(),
            bytes: text.len(),
        };
        let key = self.settings.activities_blob.clone();
        self.upload(&key, text.into_bytes()).await?;

        self.pending_upload = false;
        self.last_push_at = Some(self.clock.now());
        info!(records = summary.records, bytes = summary.bytes, "pushed activities");
        Ok(summary)
    }

    /// Uploads pending local changes, then pulls.
    ///
    /// # Errors
    ///
    /// If the upload fails its error is returned and no pull is attempted,
    /// so the local changes are neither lost nor overwritten. A failed pull
    /// is returned as-is.
    pub async fn sync(&mut self) -> Result<SyncSummary, SyncError> {
        let pushed = if self.pending_upload {
            Some(self.push().await.inspect_err(|e| {
                warn!(error = %e, "upload failed; local changes kept for retry");
            })?)
        } else {
            debug!("no local changes to upload");
            None
        };
        let pulled = self.pull().await?;
        Ok(SyncSummary { pushed, pulled })
    }

    /// Encodes the workspace roster and overwrites the membership blob.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the payload exceeds the store's cap or the
    /// upload fails.
    pub async fn publish_roster(&mut self) -> Result<PushSummary, SyncError> {
        let roster = self.workspace.roster();
        let text = codec::encode_roster(&roster);
        let summary = PushSummary {
            records: roster.len(),
            bytes: text.len(),
        };
        let key = self.settings.members_blob.clone();
        self.upload(&key, text.into_bytes()).await?;
        info!(records = summary.records, bytes = summary.bytes, "published roster");
        Ok(summary)
    }

    async fn read_text(&self, key: &str) -> Result<String, SyncError> {
        let bytes = match self.store.read(key).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                debug!(key, "blob absent, treating as empty");
                return Ok(String::new());
            },
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes).map_err(|source| SyncError::InvalidEncoding {
            key: key.to_string(),
            source,
        })
    }

    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), SyncError> {
        let limit = self.store.max_blob_bytes();
        if bytes.len() > limit {
            return Err(SyncError::PayloadTooLarge {
                key: key.to_string(),
                size: bytes.len(),
                limit,
            });
        }
        self.store.write(key, bytes).await?;
        Ok(())
    }
}
