//! Local member records and group associations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use xavyo_directory::DirectoryGuid;

macro_rules! define_local_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_local_id!(
    /// Identifier of a member in the local user store.
    MemberId
);

define_local_id!(
    /// Identifier of a group in the local user store.
    LocalGroupId
);

/// A member of the local user store.
///
/// A record with a GUID is directory-managed: its mapped fields come from the
/// directory unless write-back is enabled. Records registered locally start
/// without GUID or username and are bound to a directory entry later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Local identifier.
    pub id: MemberId,
    /// Directory binding, assigned once.
    pub guid: Option<DirectoryGuid>,
    /// Directory login handle.
    pub username: Option<String>,
    /// Set when the directory account is disabled or gone.
    pub is_expired: bool,
    /// Time of the last successful pull or push.
    pub last_synced: Option<DateTime<Utc>>,
    /// Mapped local fields (first name, surname, email, ...).
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

impl MemberRecord {
    /// A new local-only record.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: MemberId::new(),
            guid: None,
            username: None,
            is_expired: false,
            last_synced: None,
            fields: BTreeMap::new(),
        }
    }

    /// Set the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Bind to a directory entry.
    #[must_use]
    pub fn with_guid(mut self, guid: impl Into<DirectoryGuid>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    /// Set a local field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Whether the record is bound to a directory entry.
    #[must_use]
    pub fn is_directory_managed(&self) -> bool {
        self.guid.as_ref().is_some_and(|g| !g.as_str().is_empty())
    }

    /// The username, if set and non-empty.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// Get a local field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a local field value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Remove a local field value.
    pub fn remove_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// All local field values.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

impl Default for MemberRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a group association came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationSource {
    /// Derived from directory group membership; replaced on every sync pass.
    Directory,
    /// Assigned by an administrator; never touched by synchronization.
    Manual,
}

/// Membership of a member in a local group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupAssociation {
    pub member_id: MemberId,
    pub group_id: LocalGroupId,
    pub source: AssociationSource,
}

impl GroupAssociation {
    /// A directory-sourced association.
    #[must_use]
    pub fn directory(member_id: MemberId, group_id: LocalGroupId) -> Self {
        Self {
            member_id,
            group_id,
            source: AssociationSource::Directory,
        }
    }

    /// A manually assigned association.
    #[must_use]
    pub fn manual(member_id: MemberId, group_id: LocalGroupId) -> Self {
        Self {
            member_id,
            group_id,
            source: AssociationSource::Manual,
        }
    }

    #[must_use]
    pub fn is_directory_sourced(&self) -> bool {
        self.source == AssociationSource::Directory
    }
}
