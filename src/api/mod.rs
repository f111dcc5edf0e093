//! HTTP API module for health and admin endpoints.

pub mod envelope;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use envelope::{ApiResponse, ErrorBody};
pub use handlers::AppState;
pub use routes::create_router;
