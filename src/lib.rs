//! Administrative HTTP service.
//!
//! Serves a health check and placeholder admin endpoints (users, analytics,
//! system) behind logging, pretty-JSON and CORS middleware. Every response,
//! including 404s and handler failures, uses the same JSON envelope:
//!
//! ```text
//! { "success": bool, "message"?: string, "data"?: any,
//!   "error"?: { "code": string, "message": string, "details"?: string } }
//! ```
//!
//! The process holds a Redis connection for its lifetime: connected before
//! the listener binds, disconnected after shutdown.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`api`]: Routes, handlers, middleware and the response envelope
//! - [`cache`]: External cache connection lifecycle
//! - [`server`]: Startup, serving and shutdown
//! - [`metrics`]: Prometheus request metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
pub use server::AdminServer;
