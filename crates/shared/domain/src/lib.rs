//! Domain layer - accounts, credentials and token records.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod auth;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod user;

pub use auth::AuthToken;
pub use constants::*;
pub use credentials::{
    hash_password, is_valid_email, is_valid_password, validate_credentials, validate_password,
    HashCost, Password,
};
pub use error::{DomainError, DomainResult};
pub use user::{AccountRef, NewUser, User};

pub use bson::oid::ObjectId;
