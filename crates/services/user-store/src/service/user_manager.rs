//! User repository - account lifecycle over one `users` collection.
//!
//! Accounts move from active-unverified to active-verified, and from either
//! to deleted. Deleted is terminal: nothing clears the flag and no document
//! is ever physically removed.

use mongodb::bson::oid::ObjectId;
use tracing::{debug, error, info, warn};

use crate::infra::{ConnectionCache, Connector};
use crate::repository::entities::UserDocument;
use crate::repository::{UserCollection, UserDatabase, UserFilter, UserKey, UserUpdate};
use common::{AppError, AppResult, OptionExt};
use domain::{hash_password, validate_credentials, validate_password, HashCost, NewUser, User};

/// Account repository with validated, hash-only password writes.
pub struct UserManager<U> {
    users: U,
    database: String,
    hash_cost: HashCost,
}

impl<U: UserCollection> UserManager<U> {
    /// Create a repository over an already opened collection
    pub fn new(users: U, database: impl Into<String>, hash_cost: HashCost) -> Self {
        Self {
            users,
            database: database.into(),
            hash_cost,
        }
    }

    /// Build a repository on the cached client for `uri`, connecting on first use.
    pub async fn connect<C>(
        cache: &ConnectionCache<C>,
        uri: &str,
        database: &str,
        hash_cost: HashCost,
    ) -> AppResult<Self>
    where
        C: Connector,
        C::Client: UserDatabase<Users = U>,
    {
        let client = cache.acquire(uri).await?;
        debug!(database = %database, "User repository opened");
        Ok(Self::new(client.users(database), database, hash_cost))
    }

    /// Logical database this repository is bound to
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Validate, hash and insert a new account, returning its database id.
    ///
    /// Every violated rule is reported in one `Validation` error and nothing
    /// is written. A caller-supplied id is discarded. Email uniqueness is not
    /// checked here; see [`UserManager::ensure_email_index`].
    pub async fn create_user(&self, candidate: NewUser) -> AppResult<ObjectId> {
        if let Err(e) = validate_credentials(&candidate.email, &candidate.password) {
            warn!(email = %candidate.email, "Rejected new user: {}", e);
            return Err(e.into());
        }
        if candidate.id.is_some() {
            debug!(email = %candidate.email, "Discarding caller-supplied user id");
        }

        let password_hash = self.hash(candidate.password).await?;
        let document = UserDocument::new(candidate.email, password_hash);
        let email = document.email.clone();

        let id = self.users.insert(document).await.map_err(|e| {
            error!(email = %email, "Failed to insert user: {}", e);
            e.into_persistence()
        })?;

        info!(user_id = %id, "Created user");
        Ok(id)
    }

    /// Fetch by id. Soft-deleted accounts are returned with `deleted = true`.
    pub async fn fetch_user_by_id(&self, id: ObjectId) -> AppResult<User> {
        self.find(UserFilter::by_key(UserKey::Id(id))).await
    }

    /// Authentication lookup: soft-deleted accounts are never returned.
    pub async fn fetch_user_by_email(&self, email: &str) -> AppResult<User> {
        self.find(UserFilter::active(UserKey::Email(email.to_string())))
            .await
    }

    pub async fn soft_delete_by_id(&self, id: ObjectId) -> AppResult<u64> {
        self.update_where(UserFilter::by_key(UserKey::Id(id)), UserUpdate::SoftDelete)
            .await
    }

    /// Deletes the live account holding `email`; already deleted ones are skipped.
    pub async fn soft_delete_by_email(&self, email: &str) -> AppResult<u64> {
        self.update_where(
            UserFilter::active(UserKey::Email(email.to_string())),
            UserUpdate::SoftDelete,
        )
        .await
    }

    /// Idempotent: a second call reports zero modifications. Only the live
    /// account holding `email` is considered.
    pub async fn mark_verified(&self, email: &str) -> AppResult<u64> {
        self.update_where(
            UserFilter::active(UserKey::Email(email.to_string())),
            UserUpdate::MarkVerified,
        )
        .await
    }

    /// Replace the stored hash after re-validating the new password.
    ///
    /// Only `password_hash` is touched. Deleted accounts are not excluded.
    pub async fn update_password(&self, id: ObjectId, new_password: &str) -> AppResult<u64> {
        if let Err(e) = validate_password(new_password) {
            warn!(user_id = %id, "Rejected password change: {}", e);
            return Err(e.into());
        }

        let password_hash = self.hash(new_password.to_string()).await?;
        self.update_where(
            UserFilter::by_key(UserKey::Id(id)),
            UserUpdate::SetPasswordHash(password_hash),
        )
        .await
    }

    /// Enforce email uniqueness at the storage layer.
    ///
    /// Never called implicitly. Fails if duplicates already exist; afterwards
    /// a duplicate `create_user` fails with `Persistence`. Soft-deleted
    /// accounts keep holding their email.
    pub async fn ensure_email_index(&self) -> AppResult<()> {
        self.users.create_email_index().await.map_err(|e| {
            error!(database = %self.database, "Failed to create email index: {}", e);
            e.into_persistence()
        })?;
        info!(database = %self.database, "Unique email index in place");
        Ok(())
    }

    /// Release this repository's handle. The connection stays in the cache.
    pub fn close(self) {
        debug!(database = %self.database, "User repository closed");
    }

    async fn find(&self, filter: UserFilter) -> AppResult<User> {
        debug!(key = %filter.key, active_only = filter.active_only, "Finding user");
        let document = self
            .users
            .find_one(&filter)
            .await
            .map_err(|e| {
                error!(key = %filter.key, "Failed to fetch user: {}", e);
                e.into_persistence()
            })?
            .ok_or_not_found()?;

        User::try_from(document)
    }

    /// Single write path: select by one key field, apply one update.
    async fn update_where(&self, filter: UserFilter, update: UserUpdate) -> AppResult<u64> {
        let modified = self
            .users
            .update_one(&filter, &update)
            .await
            .map_err(|e| {
                error!(key = %filter.key, update = update.name(), "Failed to update user: {}", e);
                e.into_persistence()
            })?;

        if modified == 0 {
            warn!(key = %filter.key, update = update.name(), "No user modified");
        } else {
            info!(key = %filter.key, update = update.name(), modified, "Updated user");
        }
        Ok(modified)
    }

    /// Hash off the async runtime; argon2 is deliberately expensive.
    async fn hash(&self, plain_text: String) -> AppResult<String> {
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || hash_password(&plain_text, &cost))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))?
            .map_err(AppError::from)
    }
}
