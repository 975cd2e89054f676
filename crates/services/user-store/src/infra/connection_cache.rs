//! Shared, timeout-bounded registry of live database clients.
//!
//! One [`ConnectionCache`] is created at process start and handed by
//! reference to every repository factory. It memoizes one client per
//! connection URI and guarantees that only one connection attempt per URI is
//! ever in flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use common::{redact_uri, AppError, AppResult, BoxError};
use domain::DEFAULT_CONNECT_TIMEOUT_SECS;

/// Establishes clients for a connection URI.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Shared handle; clones refer to the same underlying connection
    type Client: Clone + Send + Sync + 'static;

    /// Open a client and confirm the server is reachable
    async fn connect(&self, uri: &str) -> Result<Self::Client, BoxError>;

    /// Release a client that is leaving the cache
    async fn disconnect(&self, _client: Self::Client) {}
}

/// Registry mapping connection URI to a live client.
///
/// The registry lock spans the whole lookup-connect-insert sequence, so
/// concurrent first requests for a URI wait for the first attempt and then
/// read its result. First connections to different URIs are serialized too.
pub struct ConnectionCache<C: Connector> {
    connector: Arc<C>,
    clients: Mutex<HashMap<String, C::Client>>,
    timeout: Duration,
}

impl<C: Connector> ConnectionCache<C> {
    /// Create a cache with the default ten second connect timeout.
    pub fn new(connector: C) -> Self {
        Self::with_timeout(connector, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    pub fn with_timeout(connector: C, timeout: Duration) -> Self {
        Self {
            connector: Arc::new(connector),
            clients: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Return the client for `uri`, connecting on first use.
    ///
    /// # Errors
    /// - `Validation` if `uri` is blank
    /// - `ConnectionTimeout` if no connection was made within the timeout
    /// - `ConnectionFailed` if the driver rejected the attempt
    pub async fn acquire(&self, uri: &str) -> AppResult<C::Client> {
        if uri.trim().is_empty() {
            return Err(AppError::validation("connection uri must not be empty."));
        }

        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(uri) {
            debug!(uri = %redact_uri(uri), "Reusing cached connection");
            return Ok(client.clone());
        }

        let client = self.connect(uri).await?;
        clients.insert(uri.to_string(), client.clone());
        info!(uri = %redact_uri(uri), "Connected to database");

        Ok(client)
    }

    /// Race one connection attempt against the timeout.
    ///
    /// The attempt runs as its own task. On timeout the task is detached, not
    /// aborted; its eventual result is dropped and never reaches the registry.
    async fn connect(&self, uri: &str) -> AppResult<C::Client> {
        let connector = Arc::clone(&self.connector);
        let target = uri.to_string();
        let attempt = tokio::spawn(async move { connector.connect(&target).await });

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(Ok(client))) => Ok(client),
            Ok(Ok(Err(source))) => {
                error!(uri = %redact_uri(uri), "Connection failed: {}", source);
                Err(AppError::connection_failed(redact_uri(uri), source))
            }
            Ok(Err(join_error)) => {
                error!(uri = %redact_uri(uri), "Connection task failed: {}", join_error);
                Err(AppError::connection_failed(redact_uri(uri), join_error))
            }
            Err(_) => {
                warn!(
                    uri = %redact_uri(uri),
                    timeout = ?self.timeout,
                    "Connection attempt timed out"
                );
                Err(AppError::ConnectionTimeout {
                    uri: redact_uri(uri),
                    timeout: self.timeout,
                })
            }
        }
    }

    pub async fn contains(&self, uri: &str) -> bool {
        self.clients.lock().await.contains_key(uri)
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }

    /// Remove and disconnect the client for `uri`. Returns whether one was cached.
    ///
    /// Repositories still holding the client keep a working handle only as
    /// long as the driver allows after disconnect.
    pub async fn evict(&self, uri: &str) -> bool {
        let removed = self.clients.lock().await.remove(uri);
        match removed {
            Some(client) => {
                self.connector.disconnect(client).await;
                info!(uri = %redact_uri(uri), "Evicted cached connection");
                true
            }
            None => false,
        }
    }

    /// Drain the registry and disconnect every client. Call at process shutdown.
    pub async fn shutdown(&self) {
        let drained: Vec<(String, C::Client)> = self.clients.lock().await.drain().collect();
        let count = drained.len();

        futures::future::join_all(
            drained
                .into_iter()
                .map(|(_, client)| self.connector.disconnect(client)),
        )
        .await;

        info!(connections = count, "Connection cache shut down");
    }
}
