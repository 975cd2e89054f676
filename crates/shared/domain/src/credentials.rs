//! Credential validation and password hashing.
//!
//! Everything here is pure: no shared state, no I/O. The repository calls
//! into these functions at the boundary of every mutating operation.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use regex::Regex;

use crate::constants::{
    DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB, DEFAULT_HASH_PARALLELISM, EMAIL_PATTERN,
    MIN_PASSWORD_LENGTH,
};
use crate::error::{DomainError, DomainResult};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// Check that `email` has the `local@domain.tld` shape.
///
/// No DNS or deliverability check is made.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Check that `password` meets the length policy.
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Validate a password against the policy.
pub fn validate_password(password: &str) -> DomainResult<()> {
    if is_valid_password(password) {
        Ok(())
    } else {
        Err(DomainError::validation(password_violation()))
    }
}

/// Validate an email/password pair, reporting every violated rule at once.
pub fn validate_credentials(email: &str, password: &str) -> DomainResult<()> {
    let mut violations = Vec::new();

    if !is_valid_email(email) {
        violations.push("invalid email provided.".to_string());
    }
    if !is_valid_password(password) {
        violations.push(password_violation());
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(violations))
    }
}

fn password_violation() -> String {
    format!(
        "password must be at least {} characters long.",
        MIN_PASSWORD_LENGTH
    )
}

/// Argon2 cost factor applied when hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl HashCost {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    fn argon2(&self) -> DomainResult<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| DomainError::password(format!("Invalid hash cost: {}", e)))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self::new(
            DEFAULT_HASH_MEMORY_KIB,
            DEFAULT_HASH_ITERATIONS,
            DEFAULT_HASH_PARALLELISM,
        )
    }
}

/// Hash a plaintext password into a PHC string with an embedded random salt.
pub fn hash_password(plain_text: &str, cost: &HashCost) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = cost
        .argon2()?
        .hash_password(plain_text.as_bytes(), &salt)
        .map_err(|e| DomainError::password(format!("Password hash failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Password value object holding a hash, never the plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Validate and hash a plaintext password.
    ///
    /// # Errors
    /// Returns a validation error if the password is too short, or a password
    /// error if the hashing primitive fails.
    pub fn new(plain_text: &str, cost: &HashCost) -> DomainResult<Self> {
        validate_password(plain_text)?;
        let hash = hash_password(plain_text, cost)?;
        Ok(Self { hash })
    }

    /// Wrap a hash read back from storage.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// The cost parameters are read from the stored hash itself.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}
