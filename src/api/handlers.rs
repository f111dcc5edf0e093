//! HTTP API handlers.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::{Map, Value};

use super::envelope::ApiResponse;
use crate::cache::CacheConnection;
use crate::config::Config;
use crate::error::ApiError;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "admin-service";

/// Service version reported by the health check.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Admin endpoint groups reported by the health check.
pub const ENDPOINT_GROUPS: [&str; 3] = ["users", "analytics", "system"];

/// Application state shared with handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// External cache connection, owned for its lifecycle only.
    pub cache: Arc<dyn CacheConnection>,
    /// Prometheus render handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(config: Config, cache: Arc<dyn CacheConnection>) -> Self {
        Self {
            config: Arc::new(config),
            cache,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle, enabling `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service name.
    pub service: &'static str,
    /// Status: "healthy".
    pub status: &'static str,
    /// Current time, RFC 3339 UTC.
    pub timestamp: String,
    /// Service version.
    pub version: &'static str,
    /// Known admin endpoint groups.
    pub endpoints: [&'static str; 3],
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        service: SERVICE_NAME,
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: SERVICE_VERSION,
        endpoints: ENDPOINT_GROUPS,
    })
}

/// Admin users placeholder.
pub async fn admin_users() -> Json<ApiResponse<Vec<Value>>> {
    Json(ApiResponse::success(
        "Admin users endpoint - Coming soon",
        Vec::new(),
    ))
}

/// Admin analytics placeholder.
pub async fn admin_analytics() -> Json<ApiResponse<Map<String, Value>>> {
    Json(ApiResponse::success(
        "Admin analytics endpoint - Coming soon",
        Map::new(),
    ))
}

/// Admin system placeholder.
pub async fn admin_system() -> Json<ApiResponse<Map<String, Value>>> {
    Json(ApiResponse::success(
        "Admin system endpoint - Coming soon",
        Map::new(),
    ))
}

/// Fallback for unmatched routes and methods.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ApiError::NotFound)
}
