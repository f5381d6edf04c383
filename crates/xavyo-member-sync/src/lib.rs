//! # Member Sync
//!
//! Bidirectional synchronization between directory entries (LDAP/Active
//! Directory) and members of the local user store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────────┐
//! │ MemberLifecycle  │   │ LoginReconciler │   persistence / auth events
//! └────────┬─────────┘   └────────┬────────┘
//!          └───────────┬──────────┘
//!                      ▼
//!             ┌──────────────────┐      ┌─────────────┐
//!             │ MemberSyncEngine │─────►│ SyncPolicy  │
//!             └───┬─────────┬────┘      └─────────────┘
//!                 │         │
//!                 ▼         ▼
//!      ┌─────────────┐ ┌─────────────────────────┐
//!      │ FieldMapper │ │ GroupMembershipResolver │
//!      └─────────────┘ └────────────┬────────────┘
//!                                   ▼
//!                        ┌──────────────────┐
//!                        │ DirectoryClient  │   (xavyo-directory)
//!                        └──────────────────┘
//! ```
//!
//! - **Pull** (`update_local_from_directory`): directory attributes overwrite
//!   mapped local fields.
//! - **Push** (`update_directory_from_local`): local changes are written back.
//! - **Create** (`create_users_in_directory`): local-only records get a
//!   directory entry and are bound to its GUID.
//! - **Delete** (`delete_users_in_directory`): local deletes remove the entry.
//! - **Login leniency** (`allow_update_failure_during_login`): a failed refresh
//!   does not block authentication.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use xavyo_member_sync::prelude::*;
//!
//! let policy = SyncPolicy::from_file("config/member-sync.yaml")?;
//! let engine = MemberSyncEngine::new(policy, directory, group_store)?;
//!
//! // On login
//! LoginReconciler::new(engine.clone()).after_login(&mut member).await?;
//!
//! // On save
//! let lifecycle = MemberLifecycle::new(engine, member_store);
//! let report = lifecycle.save(&mut member, WriteOptions::default()).await?;
//! ```

pub mod account_control;
pub mod engine;
pub mod error;
pub mod groups;
pub mod lifecycle;
pub mod login;
pub mod mapper;
pub mod member;
pub mod outcome;
pub mod password;
pub mod policy;
pub mod thumbnail;
pub mod validation;

pub use engine::MemberSyncEngine;
pub use error::{SyncError, SyncResult};
pub use groups::{compute_membership_diff, GroupMembershipResolver, GroupStore, MembershipDiff};
pub use lifecycle::{MemberLifecycle, MemberStore, SaveReport, WriteOptions};
pub use login::LoginReconciler;
pub use mapper::FieldMapper;
pub use member::{AssociationSource, GroupAssociation, LocalGroupId, MemberId, MemberRecord};
pub use outcome::{SkipReason, SyncOutcome, SyncStatus};
pub use policy::{FieldMapping, SyncPolicy};
pub use validation::{validate_username, FieldError, ValidationErrors};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::MemberSyncEngine;
    pub use crate::error::{SyncError, SyncResult};
    pub use crate::groups::{GroupMembershipResolver, GroupStore, MembershipDiff};
    pub use crate::lifecycle::{MemberLifecycle, MemberStore, SaveReport, WriteOptions};
    pub use crate::login::LoginReconciler;
    pub use crate::mapper::FieldMapper;
    pub use crate::member::{
        AssociationSource, GroupAssociation, LocalGroupId, MemberId, MemberRecord,
    };
    pub use crate::outcome::{SkipReason, SyncOutcome, SyncStatus};
    pub use crate::policy::{FieldMapping, SyncPolicy};
    pub use crate::validation::{FieldError, ValidationErrors};

    pub use xavyo_directory::prelude::*;
}
