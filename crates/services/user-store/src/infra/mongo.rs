//! MongoDB connector.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;

use super::connection_cache::Connector;
use common::BoxError;

/// Opens `mongodb::Client`s. The driver connects lazily, so a `ping` against
/// `admin` is issued before the client is considered established.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

#[async_trait]
impl Connector for MongoConnector {
    type Client = Client;

    async fn connect(&self, uri: &str) -> Result<Client, BoxError> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        Ok(client)
    }

    async fn disconnect(&self, client: Client) {
        client.shutdown().await;
    }
}
