//! Mock cache connection for unit testing.
//!
//! This module provides a cache double that can be used in tests
//! without a running Redis server.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::CacheConnection;
use crate::error::CacheError;

/// Configuration for mock cache behavior.
#[derive(Debug, Clone, Default)]
pub struct MockCacheConfig {
    /// Whether to fail connect requests.
    pub fail_connect: bool,
    /// Whether to fail disconnect requests.
    pub fail_disconnect: bool,
}

/// Mock cache connection for testing.
///
/// Clones share the same counters, so a test can keep a handle while the
/// server owns another.
#[derive(Debug, Clone, Default)]
pub struct MockCache {
    config: MockCacheConfig,
    connected: Arc<AtomicBool>,
    connects: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
}

impl MockCache {
    /// Create a mock that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with the given behavior.
    pub fn with_config(config: MockCacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a mock whose connect always fails.
    pub fn failing_connect() -> Self {
        Self::with_config(MockCacheConfig {
            fail_connect: true,
            ..MockCacheConfig::default()
        })
    }

    /// Number of connect calls so far.
    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of disconnect calls so far.
    pub fn disconnect_calls(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheConnection for MockCache {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> Result<(), CacheError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_connect {
            return Err(CacheError::ConnectionFailed {
                name: self.name().to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), CacheError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_disconnect {
            return Err(CacheError::NotConnected(self.name().to_string()));
        }
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracks_connection_state() {
        let cache = MockCache::new();
        let handle = cache.clone();

        cache.connect().await.unwrap();
        assert!(handle.is_connected().await);

        cache.disconnect().await.unwrap();
        assert!(!handle.is_connected().await);
        assert_eq!(handle.connect_calls(), 1);
        assert_eq!(handle.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn failing_connect_stays_disconnected() {
        let cache = MockCache::failing_connect();

        assert!(cache.connect().await.is_err());
        assert!(!cache.is_connected().await);
        assert_eq!(cache.connect_calls(), 1);
    }
}
