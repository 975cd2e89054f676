//! Infrastructure layer - connection management and storage backends.

mod connection_cache;
pub mod memory;
mod mongo;

pub use connection_cache::{ConnectionCache, Connector};
pub use memory::{MemoryClient, MemoryConnector, MemoryUserCollection};
pub use mongo::MongoConnector;
