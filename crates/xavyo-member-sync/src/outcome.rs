//! Results of sync attempts.

use crate::error::{SyncError, SyncResult};

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The directory client reports no directory configured.
    DirectoryDisabled,
    /// The record has no GUID.
    NoGuid,
    /// The record already has a GUID, so there is nothing to create.
    AlreadyBound,
    /// The record has no username to create a directory entry for.
    NoUsername,
    /// The named policy switch is off.
    PolicyDisabled(&'static str),
    /// The caller asked to skip synchronization for this write.
    Suppressed,
    /// The operation failed but policy tolerates the failure.
    FailureTolerated,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::DirectoryDisabled => write!(f, "directory disabled"),
            SkipReason::NoGuid => write!(f, "record has no GUID"),
            SkipReason::AlreadyBound => write!(f, "record already bound to a directory entry"),
            SkipReason::NoUsername => write!(f, "record has no username"),
            SkipReason::PolicyDisabled(switch) => write!(f, "policy switch '{switch}' is off"),
            SkipReason::Suppressed => write!(f, "synchronization suppressed for this write"),
            SkipReason::FailureTolerated => write!(f, "failure tolerated by policy"),
        }
    }
}

/// Successful result of a sync operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The directory round-trip completed.
    Synced,
    /// Preconditions were not met; nothing was sent to the directory.
    Skipped(SkipReason),
}

impl SyncStatus {
    #[must_use]
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced)
    }
}

/// Reported (not propagated) result of a sync attempt.
#[derive(Debug)]
pub enum SyncOutcome {
    Synced,
    Skipped(SkipReason),
    Failed(SyncError),
}

impl SyncOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed(_))
    }

    #[must_use]
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced)
    }

    /// The failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&SyncError> {
        match self {
            SyncOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SyncStatus> for SyncOutcome {
    fn from(status: SyncStatus) -> Self {
        match status {
            SyncStatus::Synced => SyncOutcome::Synced,
            SyncStatus::Skipped(reason) => SyncOutcome::Skipped(reason),
        }
    }
}

impl From<SyncResult<SyncStatus>> for SyncOutcome {
    fn from(result: SyncResult<SyncStatus>) -> Self {
        match result {
            Ok(status) => status.into(),
            Err(err) => SyncOutcome::Failed(err),
        }
    }
}
