//! Persistence lifecycle glue.
//!
//! The owning persistence layer calls these methods explicitly around record
//! writes and deletes; there is no implicit hook registration. Suppressing
//! synchronization is a per-call [`WriteOptions`] flag, so it cannot leak
//! into later writes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::engine::MemberSyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::member::{MemberId, MemberRecord};
use crate::outcome::{SkipReason, SyncOutcome, SyncStatus};
use crate::validation::ValidationErrors;

/// Local member storage as seen by the sync core.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Persist the record.
    async fn save(&self, record: &MemberRecord) -> SyncResult<()>;

    /// Delete the record.
    async fn delete(&self, member_id: MemberId) -> SyncResult<()>;
}

/// Per-write options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Skip every directory step for this write (administrative writes that
    /// must not recurse into synchronization).
    pub skip_sync: bool,
    /// Fail the write when write-back fails instead of only reporting it.
    pub require_write_back: bool,
}

impl WriteOptions {
    /// Options for a write that must not touch the directory.
    #[must_use]
    pub fn skip_sync() -> Self {
        Self {
            skip_sync: true,
            require_write_back: false,
        }
    }

    /// Options for a write whose purpose is to update the directory.
    #[must_use]
    pub fn require_write_back() -> Self {
        Self {
            skip_sync: false,
            require_write_back: true,
        }
    }
}

/// What happened to the directory during a save.
#[derive(Debug)]
pub struct SaveReport {
    /// Directory creation step, run before the write.
    pub create: SyncOutcome,
    /// Write-back and group reconciliation, run after the write.
    pub write_back: SyncOutcome,
}

/// Binds the sync engine to the persistence layer.
#[derive(Clone)]
pub struct MemberLifecycle {
    engine: MemberSyncEngine,
    store: Arc<dyn MemberStore>,
}

impl MemberLifecycle {
    pub fn new(engine: MemberSyncEngine, store: Arc<dyn MemberStore>) -> Self {
        Self { engine, store }
    }

    #[must_use]
    pub fn engine(&self) -> &MemberSyncEngine {
        &self.engine
    }

    /// Validation rules the sync core contributes to a record write.
    #[must_use]
    pub fn validate(&self, record: &MemberRecord) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.engine.check_username(record, &mut errors);
        errors
    }

    /// Save a record, synchronizing it with the directory unless
    /// `options.skip_sync` is set.
    ///
    /// The directory entry is created before the write so the new GUID is
    /// persisted with the record; a failed create aborts the save. After the
    /// write the record goes through [`MemberSyncEngine::reconcile`], whose
    /// failure is only reported unless `options.require_write_back` asks for
    /// it to fail the save. A successful write-back stores the record again,
    /// without sync, so the new `last_synced` is persisted.
    #[instrument(skip(self, record), fields(member_id = %record.id, skip_sync = options.skip_sync))]
    pub async fn save(&self, record: &mut MemberRecord, options: WriteOptions) -> SyncResult<SaveReport> {
        self.validate(record).into_result()?;

        if options.skip_sync {
            self.store.save(record).await?;
            debug!("Saved member without directory synchronization");
            return Ok(SaveReport {
                create: SyncOutcome::Skipped(SkipReason::Suppressed),
                write_back: SyncOutcome::Skipped(SkipReason::Suppressed),
            });
        }

        let create = self.engine.create_in_directory(record).await?;
        self.store.save(record).await?;

        if create.is_synced() {
            // A fresh entry already carries the local values.
            return Ok(SaveReport {
                create: SyncOutcome::Synced,
                write_back: SyncOutcome::Skipped(SkipReason::AlreadyBound),
            });
        }

        let write_back = match self.engine.reconcile(record).await {
            Ok(status) => {
                if status.is_synced() {
                    self.store.save(record).await?;
                }
                SyncOutcome::from(status)
            }
            Err(err) if options.require_write_back => return Err(err),
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "Write-back after save failed");
                SyncOutcome::Failed(err)
            }
        };

        Ok(SaveReport {
            create: SyncOutcome::from(create),
            write_back,
        })
    }

    /// Delete a record locally, then delete its directory entry when policy
    /// asks for it.
    ///
    /// The local deletion is committed first; a directory failure is reported
    /// in the returned outcome and never fails the call.
    #[instrument(skip(self, record), fields(member_id = %record.id, skip_sync = options.skip_sync))]
    pub async fn delete(&self, record: &MemberRecord, options: WriteOptions) -> SyncResult<SyncOutcome> {
        self.store.delete(record.id).await?;

        if options.skip_sync {
            return Ok(SyncOutcome::Skipped(SkipReason::Suppressed));
        }

        let outcome = SyncOutcome::from(self.engine.delete_from_directory(record).await);
        if let SyncOutcome::Failed(err) = &outcome {
            warn!(error = %err, code = err.error_code(), "Directory deletion failed after local delete");
        }
        Ok(outcome)
    }

    /// Mark a record whose directory entry disappeared as expired, without
    /// synchronizing the change back.
    #[instrument(skip(self, record), fields(member_id = %record.id))]
    pub async fn mark_expired(&self, record: &mut MemberRecord) -> SyncResult<()> {
        record.is_expired = true;
        self.store.save(record).await?;
        warn!(guid = ?record.guid, "Directory entry missing, member marked expired");
        Ok(())
    }

    /// Refresh a record from the directory outside of login and persist it.
    ///
    /// A record whose entry no longer exists is marked expired; that also
    /// counts as synced, since the local record now reflects the directory.
    pub async fn refresh_or_expire(&self, record: &mut MemberRecord) -> SyncResult<SyncStatus> {
        match self.engine.refresh(record).await {
            Ok(status) => {
                if status.is_synced() {
                    self.store.save(record).await?;
                }
                Ok(status)
            }
            Err(SyncError::RecordNotFound { .. }) => {
                self.mark_expired(record).await?;
                Ok(SyncStatus::Synced)
            }
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Debug for MemberLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberLifecycle")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
