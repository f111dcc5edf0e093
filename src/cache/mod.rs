//! External cache connection.
//!
//! The service only manages the connection lifecycle: it connects at startup
//! and disconnects on shutdown. Handlers do not read or write the cache.
//!
//! - [`client`]: Redis-backed connection
//! - [`mock`]: In-memory double for tests

pub mod client;
pub mod mock;

use async_trait::async_trait;

use crate::error::CacheError;

/// Lifecycle operations on an external cache connection.
#[async_trait]
pub trait CacheConnection: Send + Sync + std::fmt::Debug {
    /// Backend name used in logs.
    fn name(&self) -> &str;

    /// Open the connection.
    async fn connect(&self) -> Result<(), CacheError>;

    /// Close the connection. Closing an already closed connection is a no-op.
    async fn disconnect(&self) -> Result<(), CacheError>;

    /// Whether a connection is currently open.
    async fn is_connected(&self) -> bool;
}

pub use client::RedisCache;
pub use mock::MockCache;
