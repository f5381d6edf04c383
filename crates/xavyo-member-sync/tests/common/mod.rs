//! Integration test helpers for xavyo-member-sync.
//!
//! Provides an in-memory directory that records every call, plus in-memory
//! member and group stores.
//!
//! # Usage
//!
//! ```ignore
//! let ctx = TestContext::new(SyncPolicy::default().with_create_users_in_directory(true));
//! let mut member = MemberRecord::new().with_username("jdoe");
//! ctx.engine.create_in_directory(&mut member).await.unwrap();
//! assert_eq!(ctx.directory.calls("create"), 1);
//! ```

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;

use xavyo_member_sync::prelude::*;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// Failure injected into the next matching directory call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Unavailable,
    Unauthorized,
    NotFound,
    Fault,
}

impl Failure {
    fn error_for(self, operation: &str) -> DirectoryError {
        match self {
            Failure::Unavailable => DirectoryError::connection_failed("directory unreachable"),
            Failure::Unauthorized => DirectoryError::unauthorized(operation),
            Failure::NotFound => DirectoryError::not_found("entry"),
            Failure::Fault => DirectoryError::internal("malformed search response"),
        }
    }
}

#[derive(Default)]
struct DirectoryState {
    entries: HashMap<DirectoryGuid, AttributeSet>,
    groups: HashMap<DirectoryGuid, BTreeSet<DirectoryGroupId>>,
    credentials: HashMap<DirectoryGuid, String>,
    next_guids: Vec<DirectoryGuid>,
    failures: HashMap<&'static str, Failure>,
    calls: Vec<&'static str>,
    created: Vec<AttributeSet>,
    modified: Vec<(DirectoryGuid, AttributeSet)>,
}

/// In-memory directory recording every call it receives.
pub struct RecordingDirectory {
    enabled: bool,
    state: Mutex<DirectoryState>,
}

impl RecordingDirectory {
    pub fn new() -> Self {
        Self {
            enabled: true,
            state: Mutex::new(DirectoryState::default()),
        }
    }

    /// A directory reporting itself as not configured.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            state: Mutex::new(DirectoryState::default()),
        }
    }

    /// Add an entry.
    pub fn insert_entry(&self, guid: &str, attributes: AttributeSet) {
        self.state
            .lock()
            .unwrap()
            .entries
            .insert(DirectoryGuid::new(guid), attributes);
    }

    /// Remove an entry, as if deleted by another tool.
    pub fn remove_entry(&self, guid: &str) {
        self.state
            .lock()
            .unwrap()
            .entries
            .remove(&DirectoryGuid::new(guid));
    }

    pub fn entry(&self, guid: &str) -> Option<AttributeSet> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(&DirectoryGuid::new(guid))
            .cloned()
    }

    /// Set the directory groups of an entry.
    pub fn set_groups(&self, guid: &str, groups: &[&str]) {
        self.state.lock().unwrap().groups.insert(
            DirectoryGuid::new(guid),
            groups.iter().map(|g| DirectoryGroupId::new(*g)).collect(),
        );
    }

    /// GUID the next `create` call assigns.
    pub fn assign_next_guid(&self, guid: &str) {
        self.state
            .lock()
            .unwrap()
            .next_guids
            .push(DirectoryGuid::new(guid));
    }

    /// Make every later call of `operation` fail until cleared.
    pub fn fail(&self, operation: &'static str, failure: Failure) {
        self.state.lock().unwrap().failures.insert(operation, failure);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Number of calls made for `operation`.
    pub fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    /// Total number of calls, all operations included.
    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn created(&self) -> Vec<AttributeSet> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn modified(&self) -> Vec<(DirectoryGuid, AttributeSet)> {
        self.state.lock().unwrap().modified.clone()
    }

    pub fn credential(&self, guid: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .credentials
            .get(&DirectoryGuid::new(guid))
            .cloned()
    }

    fn begin(&self, operation: &'static str) -> DirectoryResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        match state.failures.get(operation) {
            Some(failure) => Err(failure.error_for(operation)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DirectoryClient for RecordingDirectory {
    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn search(&self, guid: &DirectoryGuid) -> DirectoryResult<AttributeSet> {
        self.begin("search")?;
        self.state
            .lock()
            .unwrap()
            .entries
            .get(guid)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(guid.as_str()))
    }

    async fn create(&self, attributes: AttributeSet) -> DirectoryResult<DirectoryGuid> {
        self.begin("create")?;
        let mut state = self.state.lock().unwrap();
        let guid = if state.next_guids.is_empty() {
            DirectoryGuid::new(format!("guid-{}", state.created.len() + 1))
        } else {
            state.next_guids.remove(0)
        };
        state.created.push(attributes.clone());
        state.entries.insert(guid.clone(), attributes);
        Ok(guid)
    }

    async fn modify(&self, guid: &DirectoryGuid, attributes: AttributeSet) -> DirectoryResult<()> {
        self.begin("modify")?;
        let mut state = self.state.lock().unwrap();
        let Some(entry) = state.entries.get_mut(guid) else {
            return Err(DirectoryError::not_found(guid.as_str()));
        };
        for (name, value) in attributes.iter() {
            entry.set(name.clone(), value.clone());
        }
        state.modified.push((guid.clone(), attributes));
        Ok(())
    }

    async fn delete(&self, guid: &DirectoryGuid) -> DirectoryResult<()> {
        self.begin("delete")?;
        self.state
            .lock()
            .unwrap()
            .entries
            .remove(guid)
            .map(|_| ())
            .ok_or_else(|| DirectoryError::not_found(guid.as_str()))
    }

    async fn set_credential(&self, guid: &DirectoryGuid, secret: &str) -> DirectoryResult<()> {
        self.begin("set_credential")?;
        let mut state = self.state.lock().unwrap();
        if !state.entries.contains_key(guid) {
            return Err(DirectoryError::not_found(guid.as_str()));
        }
        state.credentials.insert(guid.clone(), secret.to_string());
        Ok(())
    }

    async fn groups_for(&self, guid: &DirectoryGuid) -> DirectoryResult<BTreeSet<DirectoryGroupId>> {
        self.begin("groups_for")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .groups
            .get(guid)
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory group store.
#[derive(Default)]
pub struct InMemoryGroupStore {
    counterparts: Mutex<HashMap<DirectoryGroupId, LocalGroupId>>,
    associations: Mutex<Vec<GroupAssociation>>,
    fail_replace: Mutex<bool>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local group mirroring a directory group.
    pub fn link(&self, directory_group: &str) -> LocalGroupId {
        let id = LocalGroupId::new();
        self.counterparts
            .lock()
            .unwrap()
            .insert(DirectoryGroupId::new(directory_group), id);
        id
    }

    pub fn add_manual(&self, member_id: MemberId, group_id: LocalGroupId) {
        self.associations
            .lock()
            .unwrap()
            .push(GroupAssociation::manual(member_id, group_id));
    }

    pub fn add_directory(&self, member_id: MemberId, group_id: LocalGroupId) {
        self.associations
            .lock()
            .unwrap()
            .push(GroupAssociation::directory(member_id, group_id));
    }

    pub fn fail_replace(&self, fail: bool) {
        *self.fail_replace.lock().unwrap() = fail;
    }

    /// Groups of a member with the given source.
    pub fn groups_of(&self, member_id: MemberId, source: AssociationSource) -> BTreeSet<LocalGroupId> {
        self.associations
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.member_id == member_id && a.source == source)
            .map(|a| a.group_id)
            .collect()
    }
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn local_groups_for(
        &self,
        directory_groups: &BTreeSet<DirectoryGroupId>,
    ) -> SyncResult<BTreeSet<LocalGroupId>> {
        let counterparts = self.counterparts.lock().unwrap();
        Ok(directory_groups
            .iter()
            .filter_map(|g| counterparts.get(g).copied())
            .collect())
    }

    async fn associations(&self, member_id: MemberId) -> SyncResult<Vec<GroupAssociation>> {
        Ok(self
            .associations
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn replace_directory_groups(
        &self,
        member_id: MemberId,
        groups: BTreeSet<LocalGroupId>,
    ) -> SyncResult<()> {
        if *self.fail_replace.lock().unwrap() {
            return Err(SyncError::store("group store unavailable"));
        }
        let mut associations = self.associations.lock().unwrap();
        associations.retain(|a| !(a.member_id == member_id && a.is_directory_sourced()));
        associations.extend(
            groups
                .into_iter()
                .map(|g| GroupAssociation::directory(member_id, g)),
        );
        Ok(())
    }
}

/// In-memory member store.
#[derive(Default)]
pub struct InMemoryMemberStore {
    records: Mutex<HashMap<MemberId, MemberRecord>>,
    fail_next_save: Mutex<bool>,
    saves: Mutex<usize>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `save` fail.
    pub fn fail_next_save(&self) {
        *self.fail_next_save.lock().unwrap() = true;
    }

    pub fn get(&self, id: MemberId) -> Option<MemberRecord> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn save(&self, record: &MemberRecord) -> SyncResult<()> {
        {
            let mut fail = self.fail_next_save.lock().unwrap();
            if *fail {
                *fail = false;
                return Err(SyncError::store("write failed"));
            }
        }
        *self.saves.lock().unwrap() += 1;
        self.records
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn delete(&self, member_id: MemberId) -> SyncResult<()> {
        self.records.lock().unwrap().remove(&member_id);
        Ok(())
    }
}

/// Engine wired to in-memory collaborators.
pub struct TestContext {
    pub directory: Arc<RecordingDirectory>,
    pub groups: Arc<InMemoryGroupStore>,
    pub members: Arc<InMemoryMemberStore>,
    pub engine: MemberSyncEngine,
}

impl TestContext {
    pub fn new(policy: SyncPolicy) -> Self {
        Self::with_directory(policy, RecordingDirectory::new())
    }

    pub fn with_directory(policy: SyncPolicy, directory: RecordingDirectory) -> Self {
        init_test_logging();
        let directory = Arc::new(directory);
        let groups = Arc::new(InMemoryGroupStore::new());
        let members = Arc::new(InMemoryMemberStore::new());
        let engine = MemberSyncEngine::new(
            policy,
            Arc::clone(&directory) as Arc<dyn DirectoryClient>,
            Arc::clone(&groups) as Arc<dyn GroupStore>,
        )
        .expect("valid policy");
        Self {
            directory,
            groups,
            members,
            engine,
        }
    }

    pub fn lifecycle(&self) -> MemberLifecycle {
        MemberLifecycle::new(
            self.engine.clone(),
            Arc::clone(&self.members) as Arc<dyn MemberStore>,
        )
    }

    pub fn login(&self) -> LoginReconciler {
        LoginReconciler::new(self.engine.clone())
    }
}

/// Directory entry for John Doe.
pub fn jdoe_entry() -> AttributeSet {
    AttributeSet::new()
        .with("givenName", "John")
        .with("sn", "Doe")
        .with("mail", "jdoe@example.com")
        .with("sAMAccountName", "jdoe")
        .with("userAccountControl", 512_i64)
}
