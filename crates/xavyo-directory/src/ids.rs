//! Strongly typed directory identifiers.
//!
//! Directory entries are identified by opaque strings (objectGUID, entryUUID,
//! group DNs). The newtypes keep member identifiers and group identifiers from
//! being mixed up at compile time.
//!
//! ```
//! use xavyo_directory::{DirectoryGroupId, DirectoryGuid};
//!
//! let guid = DirectoryGuid::new("abc-123");
//! let group = DirectoryGroupId::new("cn=staff,ou=groups,dc=example,dc=com");
//!
//! assert_eq!(guid.as_str(), "abc-123");
//! assert_eq!(group.to_string(), "cn=staff,ou=groups,dc=example,dc=com");
//! ```

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! define_directory_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier value as returned by the directory.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier, returning the raw value.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_directory_id!(
    /// Stable identifier binding a local member to exactly one directory entry.
    DirectoryGuid
);

define_directory_id!(
    /// Identifier of a group in the directory (usually its DN).
    DirectoryGroupId
);

impl DirectoryGuid {
    /// Build a GUID from the raw binary `objectGUID` value Active Directory
    /// returns, encoded as standard base64.
    #[must_use]
    pub fn from_binary(bytes: &[u8]) -> Self {
        Self(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Name usable in file paths (base64 GUIDs may contain `/` and `+`).
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect()
    }
}
