//! Unified error handling for the account store.
//!
//! Every repository and connection-cache operation reports failures through
//! [`AppError`], so callers can tell a lookup miss apart from bad input and
//! from infrastructure failures.

use std::time::Duration;

use domain::DomainError;
use thiserror::Error;

/// Boxed error source carried by connection and persistence failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Validation
    /// One or more input rules were violated, all listed in the message
    #[error("{0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // Connection errors
    #[error("Timed out after {timeout:?} connecting to {uri}")]
    ConnectionTimeout { uri: String, timeout: Duration },

    #[error("Failed to connect to {uri}: {source}")]
    ConnectionFailed {
        uri: String,
        #[source]
        source: BoxError,
    },

    // Storage errors
    #[error("Persistence error: {0}")]
    Persistence(#[source] BoxError),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get a stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::NotFound => "NOT_FOUND",
            AppError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            AppError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// A lookup miss is a legitimate outcome, not an infrastructure failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound)
    }

    /// Get caller-facing message (hides driver details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::ConnectionFailed { uri, source } => {
                tracing::error!(uri = %uri, "Connection error: {:?}", source);
                format!("Could not connect to {}", uri)
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Fold any failure of a storage call into [`AppError::Persistence`].
    pub fn into_persistence(self) -> Self {
        match self {
            AppError::Persistence(_) => self,
            other => AppError::Persistence(Box::new(other)),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => AppError::Validation(violations.join(" ")),
            DomainError::Password(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(feature = "database")]
impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Persistence(Box::new(err))
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn persistence(source: impl Into<BoxError>) -> Self {
        AppError::Persistence(source.into())
    }

    pub fn connection_failed(uri: impl Into<String>, source: impl Into<BoxError>) -> Self {
        AppError::ConnectionFailed {
            uri: uri.into(),
            source: source.into(),
        }
    }
}
