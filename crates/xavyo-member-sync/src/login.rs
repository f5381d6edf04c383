//! Post-authentication refresh.

use tracing::{instrument, warn};

use crate::engine::MemberSyncEngine;
use crate::error::SyncResult;
use crate::member::MemberRecord;
use crate::outcome::{SkipReason, SyncStatus};

/// Refreshes a member from the directory after a successful login.
///
/// With `allow_update_failure_during_login` off, a failed refresh is returned
/// and the caller must abort the login. With it on, the failure is logged and
/// the login proceeds on the stored data until the next successful sync.
#[derive(Debug, Clone)]
pub struct LoginReconciler {
    engine: MemberSyncEngine,
}

impl LoginReconciler {
    #[must_use]
    pub fn new(engine: MemberSyncEngine) -> Self {
        Self { engine }
    }

    /// Pull directory data and group memberships for a member who just
    /// authenticated.
    ///
    /// The refresh runs on a copy of the record which replaces `record` only
    /// when everything succeeded, so a tolerated failure leaves it unmodified.
    /// Thumbnail files written by the pull stay on disk either way.
    #[instrument(skip(self, record), fields(member_id = %record.id, guid = ?record.guid))]
    pub async fn after_login(&self, record: &mut MemberRecord) -> SyncResult<SyncStatus> {
        if !record.is_directory_managed() {
            return Ok(SyncStatus::Skipped(SkipReason::NoGuid));
        }

        let mut working = record.clone();
        match self.engine.refresh(&mut working).await {
            Ok(status) => {
                *record = working;
                Ok(status)
            }
            Err(err) if self.engine.policy().allow_update_failure_during_login() => {
                warn!(
                    error = %err,
                    code = err.error_code(),
                    "Directory refresh failed during login, continuing with stored data"
                );
                Ok(SyncStatus::Skipped(SkipReason::FailureTolerated))
            }
            Err(err) => Err(err),
        }
    }
}
