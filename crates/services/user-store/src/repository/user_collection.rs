//! Collection abstraction over the `users` documents.

use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use super::entities::UserDocument;
use super::filter::{UserFilter, UserUpdate};
use common::{AppError, AppResult};
use domain::USERS_COLLECTION;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Single-document operations on the user collection.
///
/// Each call is one atomic document operation at the database layer.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserCollection: Send + Sync {
    /// Insert a document and return the identifier the database assigned
    async fn insert(&self, document: UserDocument) -> AppResult<ObjectId>;

    /// First document matching the filter
    async fn find_one(&self, filter: &UserFilter) -> AppResult<Option<UserDocument>>;

    /// Apply an update to the first matching document, returning the number modified
    async fn update_one(&self, filter: &UserFilter, update: &UserUpdate) -> AppResult<u64>;

    /// Create a unique index on `email`
    async fn create_email_index(&self) -> AppResult<()>;
}

/// Client handles that can open the user collection of a logical database.
pub trait UserDatabase: Clone + Send + Sync + 'static {
    type Users: UserCollection + 'static;

    fn users(&self, database: &str) -> Self::Users;
}

/// MongoDB-backed user collection.
#[derive(Clone, Debug)]
pub struct MongoUserCollection {
    collection: Collection<UserDocument>,
}

impl MongoUserCollection {
    pub fn new(collection: Collection<UserDocument>) -> Self {
        Self { collection }
    }
}

impl UserDatabase for Client {
    type Users = MongoUserCollection;

    fn users(&self, database: &str) -> MongoUserCollection {
        MongoUserCollection::new(self.database(database).collection(USERS_COLLECTION))
    }
}

#[async_trait]
impl UserCollection for MongoUserCollection {
    async fn insert(&self, document: UserDocument) -> AppResult<ObjectId> {
        let result = self.collection.insert_one(&document).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::persistence("insert did not return an ObjectId"))
    }

    async fn find_one(&self, filter: &UserFilter) -> AppResult<Option<UserDocument>> {
        Ok(self.collection.find_one(filter.to_document()).await?)
    }

    async fn update_one(&self, filter: &UserFilter, update: &UserUpdate) -> AppResult<u64> {
        let result = self
            .collection
            .update_one(filter.to_document(), update.to_document())
            .await?;
        Ok(result.modified_count)
    }

    async fn create_email_index(&self) -> AppResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;
        Ok(())
    }
}
