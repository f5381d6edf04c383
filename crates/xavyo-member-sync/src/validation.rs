//! Validation rules contributed to member writes.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::SyncError;

// Directory account names accepted for entries created from the local side.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9.]+$").expect("USERNAME_RE is a valid regex pattern"));

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<FieldError> for SyncError {
    fn from(err: FieldError) -> Self {
        SyncError::ValidationFailed {
            field: err.field,
            message: err.message,
        }
    }
}

/// Accumulated validation result of a record write.
///
/// Owned by the persistence layer; the sync core only appends its rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Errors reported for one field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Turn the first error into a `ValidationFailed`, if any.
    pub fn into_result(self) -> Result<(), SyncError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first.into()),
            None => Ok(()),
        }
    }
}

/// Check a username against the directory naming rule: lowercase letters,
/// digits and dots only.
pub fn validate_username(username: &str) -> Result<(), FieldError> {
    if USERNAME_RE.is_match(username) {
        return Ok(());
    }
    let invalid: String = username
        .chars()
        .filter(|c| !matches!(c, 'a'..='z' | '0'..='9' | '.'))
        .collect();
    let message = if username.is_empty() {
        "Username must not be empty".to_string()
    } else {
        format!(
            "Username may only contain lowercase letters, digits and dots (found '{invalid}')"
        )
    };
    Err(FieldError::new("username", message))
}
