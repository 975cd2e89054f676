//! User store configuration.

use std::env;
use std::str::FromStr;

use common::{DatabaseConfig, HashingConfig};

/// User store configuration.
#[derive(Debug, Clone, Default)]
pub struct UserStoreConfig {
    /// Where the `users` collection lives
    pub database: DatabaseConfig,
    /// Argon2 cost for new password hashes
    pub hashing: HashingConfig,
}

impl UserStoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database: DatabaseConfig {
                uri: env::var("USER_STORE_MONGODB_URI")
                    .or_else(|_| env::var("MONGODB_URI"))
                    .unwrap_or(defaults.database.uri),
                database: env::var("USER_STORE_DATABASE")
                    .or_else(|_| env::var("DATABASE_NAME"))
                    .unwrap_or(defaults.database.database),
                connect_timeout_secs: parse_var(
                    "USER_STORE_CONNECT_TIMEOUT_SECS",
                    defaults.database.connect_timeout_secs,
                ),
            },
            hashing: HashingConfig {
                memory_kib: parse_var("USER_STORE_HASH_MEMORY_KIB", defaults.hashing.memory_kib),
                iterations: parse_var("USER_STORE_HASH_ITERATIONS", defaults.hashing.iterations),
                parallelism: parse_var(
                    "USER_STORE_HASH_PARALLELISM",
                    defaults.hashing.parallelism,
                ),
            },
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
