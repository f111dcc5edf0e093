//! Redis connection built on the `redis` crate.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::CacheConnection;
use crate::error::CacheError;

/// Redis cache connection.
pub struct RedisCache {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisCache {
    /// Create a client for the given URL. No connection is opened yet.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            connection: Mutex::new(None),
        })
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("addr", &self.client.get_connection_info().addr)
            .finish()
    }
}

#[async_trait]
impl CacheConnection for RedisCache {
    fn name(&self) -> &str {
        "redis"
    }

    async fn connect(&self) -> Result<(), CacheError> {
        let mut guard = self.connection.lock().await;
        if guard.is_some() {
            debug!("Redis already connected");
            return Ok(());
        }

        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::ConnectionFailed {
                name: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;
        debug!("Redis responded to PING with {}", pong);

        *guard = Some(connection);
        info!("Connected to Redis at {}", self.client.get_connection_info().addr);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), CacheError> {
        match self.connection.lock().await.take() {
            Some(connection) => {
                drop(connection);
                info!("Disconnected from Redis");
            }
            None => warn!("Redis disconnect requested but no connection is open"),
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }
}
