//! Group membership reconciliation.
//!
//! Directory-sourced associations are recomputed from scratch on every pass
//! (set replacement, not incremental diff), so a missed event never leaves
//! drift behind. Manually assigned associations are never touched.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use xavyo_directory::{DirectoryClient, DirectoryGroupId};

use crate::error::SyncResult;
use crate::member::{GroupAssociation, LocalGroupId, MemberId, MemberRecord};

/// Local group storage as seen by the sync core.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Local groups that have one of `directory_groups` as their directory
    /// counterpart. Directory groups without a counterpart contribute nothing.
    async fn local_groups_for(
        &self,
        directory_groups: &BTreeSet<DirectoryGroupId>,
    ) -> SyncResult<BTreeSet<LocalGroupId>>;

    /// All associations of a member, whatever their source.
    async fn associations(&self, member_id: MemberId) -> SyncResult<Vec<GroupAssociation>>;

    /// Replace the member's directory-sourced associations with exactly
    /// `groups`, leaving manual associations alone.
    ///
    /// Implementations must commit all of it or none of it.
    async fn replace_directory_groups(
        &self,
        member_id: MemberId,
        groups: BTreeSet<LocalGroupId>,
    ) -> SyncResult<()>;
}

/// Changes applied by a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    /// Groups the member was added to.
    pub added: BTreeSet<LocalGroupId>,
    /// Groups the member was removed from.
    pub removed: BTreeSet<LocalGroupId>,
}

impl MembershipDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute which directory-sourced associations appear and disappear when
/// moving from `current` to `desired`.
#[must_use]
pub fn compute_membership_diff(
    desired: &BTreeSet<LocalGroupId>,
    current: &BTreeSet<LocalGroupId>,
) -> MembershipDiff {
    MembershipDiff {
        added: desired.difference(current).copied().collect(),
        removed: current.difference(desired).copied().collect(),
    }
}

/// Reconciles local group associations with directory group membership.
#[derive(Clone)]
pub struct GroupMembershipResolver {
    directory: Arc<dyn DirectoryClient>,
    store: Arc<dyn GroupStore>,
}

impl GroupMembershipResolver {
    pub fn new(directory: Arc<dyn DirectoryClient>, store: Arc<dyn GroupStore>) -> Self {
        Self { directory, store }
    }

    /// Replace the member's directory-sourced associations with the groups
    /// the directory currently reports.
    ///
    /// Every read happens before the single replace call, so a failure at any
    /// point leaves the stored associations as they were.
    #[instrument(skip(self, record), fields(member_id = %record.id, guid = ?record.guid))]
    pub async fn reconcile_groups(&self, record: &MemberRecord) -> SyncResult<MembershipDiff> {
        let Some(guid) = record.guid.as_ref().filter(|_| record.is_directory_managed()) else {
            debug!("Record has no GUID, skipping group reconciliation");
            return Ok(MembershipDiff::default());
        };
        if !self.directory.enabled() {
            debug!("Directory disabled, skipping group reconciliation");
            return Ok(MembershipDiff::default());
        }

        let directory_groups = self.directory.groups_for(guid).await?;
        let desired = self.store.local_groups_for(&directory_groups).await?;
        let current: BTreeSet<LocalGroupId> = self
            .store
            .associations(record.id)
            .await?
            .into_iter()
            .filter(GroupAssociation::is_directory_sourced)
            .map(|a| a.group_id)
            .collect();

        let diff = compute_membership_diff(&desired, &current);
        self.store.replace_directory_groups(record.id, desired).await?;

        if diff.is_empty() {
            debug!(
                directory_groups = directory_groups.len(),
                "Group memberships unchanged"
            );
        } else {
            info!(
                added = diff.added.len(),
                removed = diff.removed.len(),
                "Reconciled directory group memberships"
            );
        }
        Ok(diff)
    }
}

impl std::fmt::Debug for GroupMembershipResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupMembershipResolver")
            .field("directory_enabled", &self.directory.enabled())
            .finish_non_exhaustive()
    }
}
