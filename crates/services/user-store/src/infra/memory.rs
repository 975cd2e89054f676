//! In-memory document backend.
//!
//! Implements the same connector, client and collection contracts as the
//! MongoDB backend, suitable for tests and local development. Clients handed
//! out for the same URI share their data, like clients of one server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::connection_cache::Connector;
use crate::repository::entities::UserDocument;
use crate::repository::{UserCollection, UserDatabase, UserFilter, UserUpdate};
use common::{AppError, AppResult, BoxError};

/// Connector producing [`MemoryClient`]s.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    servers: Mutex<HashMap<String, MemoryClient>>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connection attempts served so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Client = MemoryClient;

    async fn connect(&self, uri: &str) -> Result<MemoryClient, BoxError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let mut servers = self
            .servers
            .lock()
            .map_err(|_| "in-memory server registry poisoned")?;
        Ok(servers.entry(uri.to_string()).or_default().clone())
    }
}

/// Handle to one in-memory server holding any number of logical databases.
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    databases: Arc<Mutex<HashMap<String, Arc<MemoryUsers>>>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether two handles refer to the same server.
    pub fn same_server(&self, other: &MemoryClient) -> bool {
        Arc::ptr_eq(&self.databases, &other.databases)
    }
}

impl UserDatabase for MemoryClient {
    type Users = MemoryUserCollection;

    fn users(&self, database: &str) -> MemoryUserCollection {
        let mut databases = match self.databases.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let store = databases.entry(database.to_string()).or_default();
        MemoryUserCollection {
            store: Arc::clone(store),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryUsers {
    documents: RwLock<Vec<UserDocument>>,
    unique_email: AtomicBool,
}

/// User collection kept in process memory.
#[derive(Debug, Clone)]
pub struct MemoryUserCollection {
    store: Arc<MemoryUsers>,
}

impl MemoryUserCollection {
    /// Snapshot of every stored document, deleted ones included.
    pub fn documents(&self) -> AppResult<Vec<UserDocument>> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, Vec<UserDocument>>> {
        self.store
            .documents
            .read()
            .map_err(|_| AppError::persistence("in-memory collection poisoned"))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, Vec<UserDocument>>> {
        self.store
            .documents
            .write()
            .map_err(|_| AppError::persistence("in-memory collection poisoned"))
    }
}

#[async_trait]
impl UserCollection for MemoryUserCollection {
    async fn insert(&self, mut document: UserDocument) -> AppResult<ObjectId> {
        let mut documents = self.write()?;

        if self.store.unique_email.load(Ordering::SeqCst)
            && documents.iter().any(|d| d.email == document.email)
        {
            return Err(AppError::persistence(format!(
                "duplicate key error: email {}",
                document.email
            )));
        }

        let id = ObjectId::new();
        document.id = Some(id);
        documents.push(document);
        Ok(id)
    }

    async fn find_one(&self, filter: &UserFilter) -> AppResult<Option<UserDocument>> {
        Ok(self.read()?.iter().find(|d| filter.matches(d)).cloned())
    }

    async fn update_one(&self, filter: &UserFilter, update: &UserUpdate) -> AppResult<u64> {
        let mut documents = self.write()?;
        let modified = documents
            .iter_mut()
            .find(|d| filter.matches(d))
            .map(|d| update.apply(d))
            .unwrap_or(false);
        Ok(u64::from(modified))
    }

    async fn create_email_index(&self) -> AppResult<()> {
        let documents = self.read()?;
        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = documents.iter().find(|d| !seen.insert(d.email.as_str())) {
            return Err(AppError::persistence(format!(
                "cannot build unique index: duplicate email {}",
                duplicate.email
            )));
        }
        self.store.unique_email.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::UserKey;

    fn document(email: &str) -> UserDocument {
        UserDocument::new(email.to_string(), "$argon2id$h".to_string())
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let users = MemoryClient::new().users("db");

        let id = users.insert(document("a@example.com")).await.unwrap();
        let found = users
            .find_one(&UserFilter::by_key(UserKey::Id(id)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, Some(id));
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let client = MemoryClient::new();
        client
            .users("one")
            .insert(document("a@example.com"))
            .await
            .unwrap();

        assert_eq!(client.users("one").documents().unwrap().len(), 1);
        assert!(client.users("two").documents().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_without_match_modifies_nothing() {
        let users = MemoryClient::new().users("db");

        let modified = users
            .update_one(
                &UserFilter::by_key(UserKey::Email("nobody@example.com".into())),
                &UserUpdate::SoftDelete,
            )
            .await
            .unwrap();

        assert_eq!(modified, 0);
    }

    #[tokio::test]
    async fn test_unique_email_index() {
        let users = MemoryClient::new().users("db");
        users.insert(document("a@example.com")).await.unwrap();

        users.create_email_index().await.unwrap();
        let duplicate = users.insert(document("a@example.com")).await;

        assert!(matches!(duplicate, Err(AppError::Persistence(_))));
        assert_eq!(users.documents().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_index_refused_over_existing_duplicates() {
        let users = MemoryClient::new().users("db");
        users.insert(document("a@example.com")).await.unwrap();
        users.insert(document("a@example.com")).await.unwrap();

        assert!(users.create_email_index().await.is_err());
    }

    #[tokio::test]
    async fn test_connector_shares_server_per_uri() {
        let connector = MemoryConnector::new();

        let a = connector.connect("memory://a").await.unwrap();
        let a2 = connector.connect("memory://a").await.unwrap();
        let b = connector.connect("memory://b").await.unwrap();

        assert!(a.same_server(&a2));
        assert!(!a.same_server(&b));
        assert_eq!(connector.connect_count(), 3);
    }
}
