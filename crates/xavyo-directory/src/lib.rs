//! # Directory Access
//!
//! The directory-access capability used by xavyo member synchronization.
//!
//! This crate defines what the sync core needs from an LDAP/Active Directory
//! server without implementing the wire protocol:
//!
//! - [`DirectoryClient`] - search, create, modify, delete, credential and
//!   group-membership calls against the directory
//! - [`AttributeSet`] / [`AttributeValue`] - attribute payloads
//! - [`DirectoryGuid`] / [`DirectoryGroupId`] - typed identifiers
//! - [`DirectoryError`] - errors with transient/permanent classification
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_directory::prelude::*;
//!
//! async fn refresh(client: &dyn DirectoryClient, guid: &DirectoryGuid) -> DirectoryResult<()> {
//!     let attrs = client.search(guid).await?;
//!     println!("mail = {:?}", attrs.get_string("mail"));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod ids;
pub mod operation;

pub use client::DirectoryClient;
pub use error::{DirectoryError, DirectoryResult};
pub use ids::{DirectoryGroupId, DirectoryGuid};
pub use operation::{AttributeSet, AttributeValue};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::client::DirectoryClient;
    pub use crate::error::{DirectoryError, DirectoryResult};
    pub use crate::ids::{DirectoryGroupId, DirectoryGuid};
    pub use crate::operation::{AttributeSet, AttributeValue};
}

// Re-export async_trait for client implementors
pub use async_trait::async_trait;
