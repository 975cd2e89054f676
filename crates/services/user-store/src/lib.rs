//! User Store Library
//!
//! Account and credential repository on a document database: a shared,
//! timeout-bounded connection cache and a user repository with validated
//! writes and soft delete.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use domain::HashCost;

use crate::config::UserStoreConfig;
use crate::infra::{ConnectionCache, MongoConnector};
use crate::repository::MongoUserCollection;
use crate::service::UserManager;

pub use common::{AppError, AppResult};
pub use repository::{UserFilter, UserKey, UserUpdate};
pub use service::AccountLookup;

/// Connection cache for MongoDB with the configured connect timeout.
pub fn mongo_cache(config: &UserStoreConfig) -> ConnectionCache<MongoConnector> {
    ConnectionCache::with_timeout(MongoConnector, config.database.connect_timeout())
}

/// Open the configured user repository through `cache`.
pub async fn open_user_manager(
    cache: &ConnectionCache<MongoConnector>,
    config: &UserStoreConfig,
) -> AppResult<UserManager<MongoUserCollection>> {
    UserManager::connect(
        cache,
        &config.database.uri,
        &config.database.database,
        HashCost::from(&config.hashing),
    )
    .await
}
