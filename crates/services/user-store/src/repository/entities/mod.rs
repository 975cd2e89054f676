//! Persisted document shapes.

pub mod user;

pub use user::UserDocument;
