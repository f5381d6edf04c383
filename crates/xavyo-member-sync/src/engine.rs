//! Member sync engine.
//!
//! Single-record reconciliation between a local member and its directory
//! entry. Every operation is one request-scoped round-trip. Retrying belongs
//! to the directory client or the caller.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use xavyo_directory::DirectoryClient;

use crate::account_control::UserAccountControl;
use crate::error::SyncResult;
use crate::groups::{GroupMembershipResolver, GroupStore};
use crate::mapper::FieldMapper;
use crate::member::MemberRecord;
use crate::outcome::{SkipReason, SyncStatus};
use crate::policy::SyncPolicy;
use crate::thumbnail::store_thumbnail;
use crate::validation::{validate_username, ValidationErrors};

/// Orchestrates pull, push, create and delete for one member at a time.
#[derive(Clone)]
pub struct MemberSyncEngine {
    policy: Arc<SyncPolicy>,
    mapper: FieldMapper,
    directory: Arc<dyn DirectoryClient>,
    groups: GroupMembershipResolver,
}

impl MemberSyncEngine {
    /// Create an engine. The policy is validated once here.
    pub fn new(
        policy: SyncPolicy,
        directory: Arc<dyn DirectoryClient>,
        group_store: Arc<dyn GroupStore>,
    ) -> SyncResult<Self> {
        policy.validate()?;
        let mapper = FieldMapper::new(policy.attribute_mapping().to_vec());
        let groups = GroupMembershipResolver::new(Arc::clone(&directory), group_store);
        Ok(Self {
            policy: Arc::new(policy),
            mapper,
            directory,
            groups,
        })
    }

    #[must_use]
    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    #[must_use]
    pub fn mapper(&self) -> &FieldMapper {
        &self.mapper
    }

    #[must_use]
    pub fn group_resolver(&self) -> &GroupMembershipResolver {
        &self.groups
    }

    pub(crate) fn directory(&self) -> &dyn DirectoryClient {
        self.directory.as_ref()
    }

    /// Local fields management UI must show read-only for `record`.
    #[must_use]
    pub fn read_only_fields(&self, record: &MemberRecord) -> Vec<&str> {
        self.mapper
            .read_only_fields(record, self.policy.update_directory_from_local())
    }

    /// Pull directory attributes into `record`.
    ///
    /// On failure the record, including `last_synced`, is left untouched.
    /// Thumbnail files are written to disk before the record changes and are
    /// not removed again if a later step fails.
    ///
    /// A `RecordNotFound` error means the GUID no longer exists in the
    /// directory; the caller decides whether to expire or delete the record.
    #[instrument(skip(self, record), fields(member_id = %record.id, guid = ?record.guid))]
    pub async fn pull_from_directory(&self, record: &mut MemberRecord) -> SyncResult<SyncStatus> {
        if let Some(skip) = self.precheck_bound(record) {
            return Ok(skip);
        }
        if !self.policy.update_local_from_directory() {
            debug!("Pull disabled by policy");
            return Ok(SyncStatus::Skipped(SkipReason::PolicyDisabled(
                "update_local_from_directory",
            )));
        }
        let Some(guid) = record.guid.clone() else {
            return Ok(SyncStatus::Skipped(SkipReason::NoGuid));
        };

        let attributes = self.directory.search(&guid).await?;

        // Everything fallible happens before the record is mutated.
        let mut fields = self.mapper.to_local_fields(&attributes);
        for (local_field, bytes) in self.mapper.binary_fields(&attributes) {
            let path =
                store_thumbnail(self.policy.thumbnail_path(), &guid, local_field, bytes).await?;
            fields.insert(local_field.to_string(), path.display().to_string());
        }

        let username = attributes
            .get_ignore_case(self.policy.username_attribute())
            .and_then(|v| v.first())
            .and_then(|v| v.to_text());
        let account_control = UserAccountControl::from_attributes(&attributes);

        for (name, value) in fields {
            record.set_field(name, value);
        }
        if let Some(username) = username {
            record.username = Some(username);
        }
        if let Some(uac) = account_control {
            record.is_expired = uac.is_disabled();
        }
        record.last_synced = Some(Utc::now());

        debug!("Pulled member attributes from directory");
        Ok(SyncStatus::Synced)
    }

    /// Push local field values to the directory entry (write-back).
    #[instrument(skip(self, record), fields(member_id = %record.id, guid = ?record.guid))]
    pub async fn push_to_directory(&self, record: &mut MemberRecord) -> SyncResult<SyncStatus> {
        if let Some(skip) = self.precheck_bound(record) {
            return Ok(skip);
        }
        if !self.policy.update_directory_from_local() {
            debug!("Write-back disabled by policy");
            return Ok(SyncStatus::Skipped(SkipReason::PolicyDisabled(
                "update_directory_from_local",
            )));
        }
        let Some(guid) = record.guid.as_ref() else {
            return Ok(SyncStatus::Skipped(SkipReason::NoGuid));
        };

        let attributes = self.mapper.to_directory_attributes(record);
        let count = attributes.len();
        self.directory.modify(guid, attributes).await?;

        record.last_synced = Some(Utc::now());
        info!(attributes = count, "Pushed member attributes to directory");
        Ok(SyncStatus::Synced)
    }

    /// Create a directory entry for a local-only record and bind the record
    /// to the returned GUID.
    ///
    /// Calling this again once a GUID is set does nothing, so retries are
    /// safe. The username is validated before the directory is contacted.
    #[instrument(skip(self, record), fields(member_id = %record.id, username = ?record.username))]
    pub async fn create_in_directory(&self, record: &mut MemberRecord) -> SyncResult<SyncStatus> {
        if record.is_directory_managed() {
            debug!("Record already bound, nothing to create");
            return Ok(SyncStatus::Skipped(SkipReason::AlreadyBound));
        }
        if !self.directory.enabled() {
            return Ok(SyncStatus::Skipped(SkipReason::DirectoryDisabled));
        }
        if !self.policy.create_users_in_directory() {
            debug!("Directory creation disabled by policy");
            return Ok(SyncStatus::Skipped(SkipReason::PolicyDisabled(
                "create_users_in_directory",
            )));
        }
        let Some(username) = record.username() else {
            return Ok(SyncStatus::Skipped(SkipReason::NoUsername));
        };
        validate_username(username)?;

        let attributes = self
            .mapper
            .to_directory_attributes(record)
            .with(self.policy.username_attribute(), username);

        let guid = self.directory.create(attributes).await?;
        info!(guid = %guid, "Created directory entry for member");

        record.guid = Some(guid);
        record.last_synced = Some(Utc::now());
        Ok(SyncStatus::Synced)
    }

    /// Delete the directory entry of a record that was deleted locally.
    ///
    /// Errors are returned to the caller, but the local deletion that
    /// triggered this has already committed and must not be undone.
    #[instrument(skip(self, record), fields(member_id = %record.id, guid = ?record.guid))]
    pub async fn delete_from_directory(&self, record: &MemberRecord) -> SyncResult<SyncStatus> {
        if let Some(skip) = self.precheck_bound(record) {
            return Ok(skip);
        }
        if !self.policy.delete_users_in_directory() {
            debug!("Directory deletion disabled by policy");
            return Ok(SyncStatus::Skipped(SkipReason::PolicyDisabled(
                "delete_users_in_directory",
            )));
        }
        let Some(guid) = record.guid.as_ref() else {
            return Ok(SyncStatus::Skipped(SkipReason::NoGuid));
        };

        self.directory.delete(guid).await?;
        info!("Deleted directory entry for member");
        Ok(SyncStatus::Synced)
    }

    /// Push local changes, then reconcile group memberships.
    ///
    /// Group reconciliation assumes the push completed, so it only runs after
    /// a successful push. The two steps are not atomic; each can be retried
    /// on its own.
    pub async fn write_back(&self, record: &mut MemberRecord) -> SyncResult<SyncStatus> {
        let status = self.push_to_directory(record).await?;
        if status.is_synced() {
            self.groups.reconcile_groups(record).await?;
        }
        Ok(status)
    }

    /// Top-level entry invoked on record persistence.
    ///
    /// Creates the directory entry for an unbound record when creation is
    /// enabled, otherwise writes local changes back. Never pulls, so the
    /// change that triggered the write is not overwritten.
    #[instrument(skip(self, record), fields(member_id = %record.id, guid = ?record.guid))]
    pub async fn reconcile(&self, record: &mut MemberRecord) -> SyncResult<SyncStatus> {
        if !record.is_directory_managed() {
            if self.policy.create_users_in_directory() && record.username().is_some() {
                return self.create_in_directory(record).await;
            }
            debug!("Unbound record without creation step, passing through");
            return Ok(SyncStatus::Skipped(SkipReason::NoGuid));
        }
        if self.policy.update_directory_from_local() {
            return self.write_back(record).await;
        }
        Ok(SyncStatus::Skipped(SkipReason::PolicyDisabled(
            "update_directory_from_local",
        )))
    }

    /// Pull directory attributes, then reconcile group memberships.
    pub async fn refresh(&self, record: &mut MemberRecord) -> SyncResult<SyncStatus> {
        let status = self.pull_from_directory(record).await?;
        if status.is_synced() {
            self.groups.reconcile_groups(record).await?;
        }
        Ok(status)
    }

    /// Contribute the username rule to a record's validation result.
    ///
    /// Only applies when the record is about to be created in the directory.
    pub fn check_username(&self, record: &MemberRecord, errors: &mut ValidationErrors) {
        if !self.policy.create_users_in_directory() || record.is_directory_managed() {
            return;
        }
        if let Some(username) = record.username() {
            if let Err(err) = validate_username(username) {
                warn!(member_id = %record.id, "Username rejected by directory naming rule");
                errors.push(err);
            }
        }
    }

    /// Common guard for operations on bound records.
    pub(crate) fn precheck_bound(&self, record: &MemberRecord) -> Option<SyncStatus> {
        if !record.is_directory_managed() {
            debug!("Record has no GUID");
            return Some(SyncStatus::Skipped(SkipReason::NoGuid));
        }
        if !self.directory.enabled() {
            debug!("Directory disabled");
            return Some(SyncStatus::Skipped(SkipReason::DirectoryDisabled));
        }
        None
    }
}

impl std::fmt::Debug for MemberSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberSyncEngine")
            .field("policy", &self.policy)
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}
