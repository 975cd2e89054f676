//! User domain entity and related types.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ObjectId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created: DateTime<Utc>,
    pub verified: bool,
    /// Soft delete flag; once set it is never cleared
    pub deleted: bool,
}

impl User {
    /// Check if user is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Check if user is active (not deleted)
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Reference handed to token issuance.
    pub fn account(&self) -> AccountRef {
        AccountRef {
            id: self.id,
            email: self.email.clone(),
            verified: self.verified,
            active: self.is_active(),
        }
    }
}

/// Account candidate submitted for creation.
///
/// The password is plaintext and is hashed before it reaches storage. Any
/// `id` supplied by the caller is ignored.
#[derive(Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default, rename = "_id")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// What a token issuer needs to know about an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: ObjectId,
    pub email: String,
    pub verified: bool,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(deleted: bool) -> User {
        User {
            id: ObjectId::new(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            created: Utc::now(),
            verified: true,
            deleted,
        }
    }

    #[test]
    fn test_active_and_deleted_flags() {
        assert!(sample(false).is_active());
        assert!(sample(true).is_deleted());
        assert!(!sample(true).is_active());
    }

    #[test]
    fn test_account_ref() {
        let user = sample(true);
        let account = user.account();

        assert_eq!(account.id, user.id);
        assert_eq!(account.email, user.email);
        assert!(account.verified);
        assert!(!account.active);
    }

    #[test]
    fn test_serialization_omits_hash() {
        let json = serde_json::to_string(&sample(false)).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2id$hash"));
    }

    #[test]
    fn test_new_user_debug_redacts_password() {
        let candidate = NewUser::new("test@example.com", "hunter2hunter2");
        let debug = format!("{:?}", candidate);

        assert!(!debug.contains("hunter2hunter2"));
        assert!(debug.contains("test@example.com"));
    }
}
