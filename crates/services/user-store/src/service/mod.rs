//! Service layer - account lifecycle and lookups for token issuance.

mod account_lookup;
mod user_manager;

pub use account_lookup::AccountLookup;
pub use user_manager::UserManager;
