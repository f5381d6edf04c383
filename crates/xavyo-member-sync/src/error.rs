//! Member sync error types.

use thiserror::Error;

use xavyo_directory::DirectoryError;

/// Errors that can occur while synchronizing a member.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The directory could not be reached.
    #[error("Directory unavailable: {source}")]
    DirectoryUnavailable {
        #[source]
        source: DirectoryError,
    },

    /// The record's GUID has no directory counterpart.
    #[error("Directory record not found: {identifier}")]
    RecordNotFound { identifier: String },

    /// The directory refused the request (permissions, schema, constraints).
    #[error("Directory rejected the request: {source}")]
    WriteRejected {
        #[source]
        source: DirectoryError,
    },

    /// The directory returned malformed data or failed internally.
    #[error("Directory fault: {source}")]
    DirectoryFault {
        #[source]
        source: DirectoryError,
    },

    /// A field failed validation before any directory call was made.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// The attribute mapping cannot be applied unambiguously.
    #[error("Ambiguous attribute mapping: {message}")]
    MappingAmbiguous { message: String },

    /// Persistence collaborator error.
    #[error("Store error: {message}")]
    Store { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O error (thumbnail storage, config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Create a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an ambiguous mapping error.
    pub fn mapping_ambiguous(message: impl Into<String>) -> Self {
        Self::MappingAmbiguous {
            message: message.into(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::DirectoryUnavailable { .. } => "DIRECTORY_UNAVAILABLE",
            SyncError::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            SyncError::WriteRejected { .. } => "WRITE_REJECTED",
            SyncError::DirectoryFault { .. } => "DIRECTORY_FAULT",
            SyncError::ValidationFailed { .. } => "VALIDATION_FAILED",
            SyncError::MappingAmbiguous { .. } => "MAPPING_AMBIGUOUS",
            SyncError::Store { .. } => "STORE_ERROR",
            SyncError::Configuration { .. } => "CONFIGURATION_ERROR",
            SyncError::Io(_) => "IO_ERROR",
        }
    }

    /// Check if the caller may retry later. Nothing is retried internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::DirectoryUnavailable { .. })
    }

    /// Check if this is a directory outage.
    pub fn is_directory_unavailable(&self) -> bool {
        matches!(self, SyncError::DirectoryUnavailable { .. })
    }
}

impl From<DirectoryError> for SyncError {
    fn from(err: DirectoryError) -> Self {
        if err.is_transient() {
            return SyncError::DirectoryUnavailable { source: err };
        }
        match err {
            DirectoryError::ObjectNotFound { identifier } => SyncError::RecordNotFound { identifier },
            err @ (DirectoryError::InvalidData { .. } | DirectoryError::Internal { .. }) => {
                SyncError::DirectoryFault { source: err }
            }
            other => SyncError::WriteRejected { source: other },
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
