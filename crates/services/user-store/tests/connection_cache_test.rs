//! Connection cache concurrency and timeout behaviour.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

use common::BoxError;
use user_store_lib::infra::{ConnectionCache, Connector, MemoryConnector};
use user_store_lib::AppError;

/// Connector whose attempts take `delays[n]` for the n-th call (last one repeats).
struct ScriptedConnector {
    attempts: Arc<AtomicUsize>,
    delays: Vec<Option<Duration>>,
}

impl ScriptedConnector {
    fn new(delays: Vec<Option<Duration>>) -> (Self, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        (
            Self {
                attempts: Arc::clone(&attempts),
                delays,
            },
            attempts,
        )
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    /// Serial number of the attempt that produced the client
    type Client = usize;

    async fn connect(&self, _uri: &str) -> Result<usize, BoxError> {
        let serial = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self
            .delays
            .get(serial - 1)
            .or_else(|| self.delays.last())
            .copied()
            .flatten();

        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            // Unreachable server: never answers
            None => std::future::pending::<()>().await,
        }
        Ok(serial)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquires_connect_once() {
    let (connector, attempts) = ScriptedConnector::new(vec![Some(Duration::from_millis(50))]);
    let cache = Arc::new(ConnectionCache::new(connector));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.acquire("mongodb://fresh:27017").await })
        })
        .collect();

    let clients: Vec<usize> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(clients.iter().all(|&client| client == 1));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquires_share_memory_client() {
    let cache = Arc::new(ConnectionCache::new(MemoryConnector::new()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.acquire("memory://shared").await })
        })
        .collect();

    let clients: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert!(clients.windows(2).all(|pair| pair[0].same_server(&pair[1])));
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_uri_times_out() {
    let (connector, _) = ScriptedConnector::new(vec![None]);
    let cache = ConnectionCache::with_timeout(connector, Duration::from_secs(10));

    let started = Instant::now();
    let result = cache.acquire("mongodb://unreachable:27017").await;
    let elapsed = started.elapsed();

    match result {
        Err(AppError::ConnectionTimeout { uri, timeout }) => {
            assert_eq!(uri, "mongodb://unreachable:27017");
            assert_eq!(timeout, Duration::from_secs(10));
        }
        other => panic!("expected ConnectionTimeout, got {:?}", other),
    }
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(11));
    assert!(!cache.contains("mongodb://unreachable:27017").await);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_attempt_never_overwrites_entry() {
    // First attempt outlives the timeout, the retry connects at once.
    let (connector, attempts) = ScriptedConnector::new(vec![
        Some(Duration::from_secs(20)),
        Some(Duration::from_millis(1)),
    ]);
    let cache = ConnectionCache::with_timeout(connector, Duration::from_secs(10));
    let uri = "mongodb://slow:27017";

    let first = cache.acquire(uri).await;
    assert!(matches!(first, Err(AppError::ConnectionTimeout { .. })));

    let retry = cache.acquire(uri).await.unwrap();
    assert_eq!(retry, 2);

    // Let the abandoned attempt finish in the background.
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(cache.acquire(uri).await.unwrap(), 2);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_then_retry_can_succeed() {
    let (connector, _) = ScriptedConnector::new(vec![None, Some(Duration::from_secs(1))]);
    let cache = ConnectionCache::with_timeout(connector, Duration::from_secs(10));

    assert_err!(cache.acquire("mongodb://flaky").await);
    assert_eq!(assert_ok!(cache.acquire("mongodb://flaky").await), 2);
}
