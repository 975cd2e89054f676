//! Auth token record.
//!
//! A plain data shape: issuance policy, expiry enforcement and revocation
//! belong to the authentication service.

use std::time::Duration;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::AccountRef;

/// Short-lived token owned by a user. Many tokens may reference one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token: String,
    pub user: ObjectId,
    pub created: DateTime<Utc>,
    /// Time-to-live in seconds
    pub expires: u64,
}

impl AuthToken {
    /// Build a token record for `account`, stamped now.
    pub fn issue(account: &AccountRef, token: impl Into<String>, ttl: Duration) -> Self {
        Self {
            id: None,
            token: token.into(),
            user: account.id,
            created: Utc::now(),
            expires: ttl.as_secs(),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.expires)
    }

    /// Instant after which the token should no longer be honoured.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.expires)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| self.created.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
