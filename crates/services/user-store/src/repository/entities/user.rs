//! User document as persisted in the `users` collection.

use chrono::Utc;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use common::{AppError, AppResult};
use domain::User;

/// `{ _id, email, password_hash, created, verified, deleted }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    /// Assigned by the database on insert (NULL = not yet persisted)
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password_hash: String,
    pub created: DateTime,
    pub verified: bool,
    pub deleted: bool,
}

impl UserDocument {
    /// Fresh, unverified, active document stamped now and without an id.
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: None,
            email,
            password_hash,
            created: DateTime::from_chrono(Utc::now()),
            verified: false,
            deleted: false,
        }
    }
}

/// Convert stored document to domain entity
impl TryFrom<UserDocument> for User {
    type Error = AppError;

    fn try_from(document: UserDocument) -> AppResult<Self> {
        let id = document
            .id
            .ok_or_else(|| AppError::internal("user document has no _id"))?;

        Ok(User {
            id,
            email: document.email,
            password_hash: document.password_hash,
            created: document.created.to_chrono(),
            verified: document.verified,
            deleted: document.deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn test_new_document_defaults() {
        let document = UserDocument::new("a@example.com".into(), "$argon2id$h".into());

        assert!(document.id.is_none());
        assert!(!document.verified);
        assert!(!document.deleted);
    }

    #[test]
    fn test_serialized_shape_omits_missing_id() {
        let document = UserDocument::new("a@example.com".into(), "$argon2id$h".into());
        let bson = bson::to_document(&document).unwrap();

        assert!(!bson.contains_key("_id"));
        assert_eq!(bson.get_str("email").unwrap(), "a@example.com");
        assert_eq!(bson.get_str("password_hash").unwrap(), "$argon2id$h");
        assert!(bson.get_datetime("created").is_ok());
        assert!(!bson.get_bool("verified").unwrap());
        assert!(!bson.get_bool("deleted").unwrap());
    }

    #[test]
    fn test_decode_stored_document() {
        let id = ObjectId::new();
        let stored = doc! {
            "_id": id,
            "email": "a@example.com",
            "password_hash": "$argon2id$h",
            "created": DateTime::now(),
            "verified": true,
            "deleted": false,
        };

        let document: UserDocument = bson::from_document(stored).unwrap();
        let user = User::try_from(document).unwrap();

        assert_eq!(user.id, id);
        assert!(user.verified);
        assert!(user.is_active());
    }

    #[test]
    fn test_document_without_id_is_rejected() {
        let document = UserDocument::new("a@example.com".into(), "$argon2id$h".into());
        assert!(matches!(User::try_from(document), Err(AppError::Internal(_))));
    }
}
