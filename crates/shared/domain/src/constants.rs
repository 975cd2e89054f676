//! Domain-level constants.
//!
//! These constants define credential rules and storage defaults.

// =============================================================================
// Credentials
// =============================================================================

/// Minimum password length requirement (in characters)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Shape an email address must match: `local@domain.tld`
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Argon2 memory cost in KiB used when nothing else is configured
pub const DEFAULT_HASH_MEMORY_KIB: u32 = argon2::Params::DEFAULT_M_COST;

/// Argon2 iteration count used when nothing else is configured
pub const DEFAULT_HASH_ITERATIONS: u32 = argon2::Params::DEFAULT_T_COST;

/// Argon2 lane count used when nothing else is configured
pub const DEFAULT_HASH_PARALLELISM: u32 = argon2::Params::DEFAULT_P_COST;

// =============================================================================
// Storage
// =============================================================================

/// Logical database used when none is configured
pub const DEFAULT_DATABASE: &str = "object-store";

/// Collection holding one document per account
pub const USERS_COLLECTION: &str = "users";

/// Upper bound for establishing a new database connection
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
