//! Directory client capability
//!
//! The sync core never speaks LDAP itself. It calls into an implementation of
//! [`DirectoryClient`] which owns binding, searching and modifying entries,
//! along with any connection pooling or retry policy.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::ids::{DirectoryGroupId, DirectoryGuid};
use crate::operation::AttributeSet;

/// Authenticated access to the directory.
///
/// Every method is a single round-trip. Implementations report an unreachable
/// directory with a transient [`DirectoryError`](crate::DirectoryError) and a
/// missing entry with `ObjectNotFound`.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Whether a directory is configured at all. When this returns `false`
    /// callers treat every synchronization step as a no-op.
    fn enabled(&self) -> bool;

    /// Fetch the attributes of the entry identified by `guid`.
    async fn search(&self, guid: &DirectoryGuid) -> DirectoryResult<AttributeSet>;

    /// Create a new entry and return the GUID the directory assigned to it.
    async fn create(&self, attributes: AttributeSet) -> DirectoryResult<DirectoryGuid>;

    /// Replace the given attributes on an existing entry.
    async fn modify(&self, guid: &DirectoryGuid, attributes: AttributeSet) -> DirectoryResult<()>;

    /// Delete an entry.
    async fn delete(&self, guid: &DirectoryGuid) -> DirectoryResult<()>;

    /// Set the credential (password) of an entry.
    async fn set_credential(&self, guid: &DirectoryGuid, secret: &str) -> DirectoryResult<()>;

    /// Groups the entry is currently a member of.
    async fn groups_for(&self, guid: &DirectoryGuid) -> DirectoryResult<BTreeSet<DirectoryGroupId>>;
}
