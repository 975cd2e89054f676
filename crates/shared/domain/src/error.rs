//! Domain-level errors.
//!
//! These errors represent credential rule violations and hashing failures.
//! They are independent of infrastructure concerns (database, transport).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more input rules were violated; every violation is kept
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    /// The hashing primitive rejected its input or parameters
    #[error("Password error: {0}")]
    Password(String),
}

impl DomainError {
    /// Create a validation error carrying a single violation
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(vec![msg.into()])
    }

    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Violations carried by a validation error, empty for other kinds
    pub fn violations(&self) -> &[String] {
        match self {
            DomainError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_joins_violations() {
        let err = DomainError::Validation(vec![
            "invalid email provided.".to_string(),
            "password too short.".to_string(),
        ]);

        assert_eq!(err.to_string(), "invalid email provided. password too short.");
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_non_validation_has_no_violations() {
        assert!(DomainError::password("bad salt").violations().is_empty());
    }
}
