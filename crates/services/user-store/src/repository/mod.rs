//! Repository layer for data access.

pub mod entities;
pub mod filter;
mod user_collection;

pub use filter::{UserFilter, UserKey, UserUpdate};
pub use user_collection::{MongoUserCollection, UserCollection, UserDatabase};

#[cfg(any(test, feature = "test-utils"))]
pub use user_collection::MockUserCollection;
