//! Typed filters and updates for the `users` collection.
//!
//! Every read and write names the account through a [`UserKey`] and every
//! mutation through a [`UserUpdate`], so the BSON shape of each query lives
//! in exactly one place.

use std::fmt;

use mongodb::bson::{doc, oid::ObjectId, Document};

use super::entities::UserDocument;

/// Key field identifying one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Id(ObjectId),
    Email(String),
}

impl UserKey {
    fn matches(&self, document: &UserDocument) -> bool {
        match self {
            UserKey::Id(id) => document.id.as_ref() == Some(id),
            UserKey::Email(email) => &document.email == email,
        }
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserKey::Id(id) => write!(f, "_id={}", id),
            UserKey::Email(email) => write!(f, "email={}", email),
        }
    }
}

/// Filter selecting one account, optionally hiding soft-deleted ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    pub key: UserKey,
    pub active_only: bool,
}

impl UserFilter {
    /// Match on the key alone, deleted or not.
    pub fn by_key(key: UserKey) -> Self {
        Self {
            key,
            active_only: false,
        }
    }

    /// Match on the key, skipping soft-deleted accounts.
    pub fn active(key: UserKey) -> Self {
        Self {
            key,
            active_only: true,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut filter = match &self.key {
            UserKey::Id(id) => doc! { "_id": *id },
            UserKey::Email(email) => doc! { "email": email.as_str() },
        };
        if self.active_only {
            filter.insert("deleted", false);
        }
        filter
    }

    /// Evaluate the filter against a document held outside the database.
    pub fn matches(&self, document: &UserDocument) -> bool {
        self.key.matches(document) && !(self.active_only && document.deleted)
    }
}

/// The mutations the repository is allowed to make.
#[derive(Clone, PartialEq, Eq)]
pub enum UserUpdate {
    SoftDelete,
    MarkVerified,
    SetPasswordHash(String),
}

impl UserUpdate {
    /// Short name used in logs; never includes the hash.
    pub fn name(&self) -> &'static str {
        match self {
            UserUpdate::SoftDelete => "soft_delete",
            UserUpdate::MarkVerified => "mark_verified",
            UserUpdate::SetPasswordHash(_) => "set_password_hash",
        }
    }

    pub fn to_document(&self) -> Document {
        match self {
            UserUpdate::SoftDelete => doc! { "$set": { "deleted": true } },
            UserUpdate::MarkVerified => doc! { "$set": { "verified": true } },
            UserUpdate::SetPasswordHash(hash) => doc! { "$set": { "password_hash": hash.as_str() } },
        }
    }

    /// Apply to a document in place, returning whether any field changed.
    pub fn apply(&self, document: &mut UserDocument) -> bool {
        match self {
            UserUpdate::SoftDelete => !std::mem::replace(&mut document.deleted, true),
            UserUpdate::MarkVerified => !std::mem::replace(&mut document.verified, true),
            UserUpdate::SetPasswordHash(hash) => {
                if &document.password_hash == hash {
                    false
                } else {
                    document.password_hash = hash.clone();
                    true
                }
            }
        }
    }
}

impl fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
