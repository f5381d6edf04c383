//! Active Directory `userAccountControl` handling.
//!
//! Only the bits that drive the local expiration flag are interpreted.

use xavyo_directory::{AttributeSet, AttributeValue};

/// `userAccountControl` attribute name.
pub const ATTRIBUTE: &str = "userAccountControl";

/// ACCOUNTDISABLE flag.
pub const ACCOUNT_DISABLE: i64 = 0x2;

/// Parsed `userAccountControl` bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAccountControl(i64);

impl UserAccountControl {
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Read the bitfield from a directory entry, if present and numeric.
    #[must_use]
    pub fn from_attributes(attributes: &AttributeSet) -> Option<Self> {
        attributes
            .get_ignore_case(ATTRIBUTE)
            .and_then(AttributeValue::first)
            .and_then(AttributeValue::as_integer)
            .map(Self)
    }

    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.0 & ACCOUNT_DISABLE != 0
    }
}
