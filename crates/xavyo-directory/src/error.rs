//! Directory client error types
//!
//! Error definitions with transient/permanent classification. The sync core
//! relies on the classification to tell an unreachable directory apart from
//! one that refused a write.

use thiserror::Error;

/// Error that can occur while talking to the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Connection errors (transient)
    /// Failed to establish a connection to the directory.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection timed out.
    #[error("connection timeout after {timeout_secs} seconds")]
    ConnectionTimeout { timeout_secs: u64 },

    /// Directory is temporarily unavailable (busy, unwilling to perform).
    #[error("directory unavailable: {message}")]
    TargetUnavailable { message: String },

    /// Network error during communication.
    #[error("network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Permanent errors
    /// The bind account lacks permission for the operation.
    #[error("authorization failed: insufficient permissions for {operation}")]
    AuthorizationFailed { operation: String },

    /// Entry not found in the directory.
    #[error("object not found: {identifier}")]
    ObjectNotFound { identifier: String },

    /// Entry already exists (create conflict).
    #[error("object already exists: {identifier}")]
    ObjectAlreadyExists { identifier: String },

    /// Schema or policy constraint violation (e.g. password complexity).
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Invalid attribute data.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// Internal client error.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DirectoryError {
    /// Check if this error is transient, i.e. caused by the directory being
    /// unreachable rather than by the request itself.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::ConnectionFailed { .. }
                | DirectoryError::ConnectionTimeout { .. }
                | DirectoryError::TargetUnavailable { .. }
                | DirectoryError::NetworkError { .. }
        )
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Check if the directory reported the entry as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::ObjectNotFound { .. })
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            DirectoryError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            DirectoryError::TargetUnavailable { .. } => "TARGET_UNAVAILABLE",
            DirectoryError::NetworkError { .. } => "NETWORK_ERROR",
            DirectoryError::AuthorizationFailed { .. } => "AUTHORIZATION_FAILED",
            DirectoryError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            DirectoryError::ObjectAlreadyExists { .. } => "OBJECT_EXISTS",
            DirectoryError::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            DirectoryError::InvalidData { .. } => "INVALID_DATA",
            DirectoryError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        DirectoryError::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a not found error.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        DirectoryError::ObjectNotFound {
            identifier: identifier.into(),
        }
    }

    /// Create an authorization error.
    pub fn unauthorized(operation: impl Into<String>) -> Self {
        DirectoryError::AuthorizationFailed {
            operation: operation.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DirectoryError::Internal {
            message: message.into(),
            source: None,
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
