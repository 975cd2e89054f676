//! Account resolution for token issuance.
//!
//! A token issuer needs to know whether an account exists and is active
//! without reaching into the database itself.

use async_trait::async_trait;

use super::user_manager::UserManager;
use crate::repository::{UserCollection, UserKey};
use common::AppResult;
use domain::AccountRef;

#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Resolve an account by id or email.
    ///
    /// Email lookups only see active accounts; id lookups also return deleted
    /// ones with `active = false`. A miss is `AppError::NotFound`.
    async fn find_account(&self, key: &UserKey) -> AppResult<AccountRef>;
}

#[async_trait]
impl<U: UserCollection + 'static> AccountLookup for UserManager<U> {
    async fn find_account(&self, key: &UserKey) -> AppResult<AccountRef> {
        let user = match key {
            UserKey::Id(id) => self.fetch_user_by_id(*id).await?,
            UserKey::Email(email) => self.fetch_user_by_email(email).await?,
        };
        Ok(user.account())
    }
}
