//! Password propagation to the directory.
//!
//! Local password validation has already succeeded by the time this runs; the
//! new password is forwarded as-is so the local and directory credential
//! stores do not diverge.

use tracing::{info, instrument};

use crate::engine::MemberSyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::member::MemberRecord;
use crate::outcome::{SkipReason, SyncStatus};

impl MemberSyncEngine {
    /// Forward a changed password to the member's directory entry.
    ///
    /// Failures are returned to the caller, which must not report the password
    /// change as successful.
    #[instrument(skip(self, record, new_password), fields(member_id = %record.id, guid = ?record.guid))]
    pub async fn on_password_change(
        &self,
        record: &MemberRecord,
        new_password: &str,
    ) -> SyncResult<SyncStatus> {
        if let Some(skip) = self.precheck_bound(record) {
            return Ok(skip);
        }
        let Some(guid) = record.guid.as_ref() else {
            return Ok(SyncStatus::Skipped(SkipReason::NoGuid));
        };
        if new_password.is_empty() {
            return Err(SyncError::validation("password", "Password cannot be empty"));
        }

        self.directory().set_credential(guid, new_password).await?;
        info!("Propagated password change to directory");
        Ok(SyncStatus::Synced)
    }
}
