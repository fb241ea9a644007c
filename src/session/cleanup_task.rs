use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::repository::InMemorySessionStore;

/// Configuration for the session cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often expired session records are dropped
    pub cleanup_interval: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// Periodically drops expired records from the in-memory session store.
/// Runs until the surrounding task is aborted.
#[instrument(skip(store))]
pub async fn start_cleanup_task(store: Arc<InMemorySessionStore>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        "Starting session cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        let purged = store.purge_expired().await;
        if purged > 0 {
            info!(purged, "Expired session records removed");
        } else {
            debug!("No expired session records");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{keys, SessionStore};
    use crate::token::TokenService;

    #[tokio::test]
    async fn test_cleanup_reclaims_expired_records() {
        let store = Arc::new(InMemorySessionStore::new());
        for i in 0..50 {
            store
                .set_raw(&keys::access(&format!("stale-{}", i)), "1", chrono::Duration::seconds(-1))
                .await;
        }
        let pair = TokenService::new("secret value", "refresh value")
            .create_token(7)
            .unwrap();
        store.store_token_details(7, &pair).await.unwrap();
        assert_eq!(store.raw_key_count().await, 53);

        let handle = tokio::spawn(start_cleanup_task(
            store.clone(),
            CleanupConfig {
                cleanup_interval: Duration::from_millis(10),
            },
        ));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(store.raw_key_count().await, 3);
        assert_eq!(store.live_key_count().await, 3);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_records_expiring_later() {
        let store = Arc::new(InMemorySessionStore::new());
        store
            .set_raw(&keys::access("short"), "1", chrono::Duration::milliseconds(30))
            .await;
        store
            .set_raw(&keys::access("long"), "2", chrono::Duration::minutes(5))
            .await;

        let handle = tokio::spawn(start_cleanup_task(
            store.clone(),
            CleanupConfig {
                cleanup_interval: Duration::from_millis(10),
            },
        ));
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.abort();

        assert_eq!(store.raw_key_count().await, 1);
        assert_eq!(store.get_raw(&keys::access("long")).await, Some("2".to_string()));
    }
}
