//! HTTP API route definitions.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use super::handlers::{
    admin_analytics, admin_system, admin_users, health, metrics, not_found, AppState,
};
use super::middleware::{
    cors_layer, panic_response, pretty_json, render_errors, request_trace_layer,
};
use crate::metrics::track_requests;

/// Routes served by the admin service, without middleware or state.
///
/// Every path answers unsupported methods with the 404 envelope.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // Health endpoint
        .route("/health", get(health).fallback(not_found))
        // Admin endpoints
        .route("/api/admin/users", get(admin_users).fallback(not_found))
        .route("/api/admin/analytics", get(admin_analytics).fallback(not_found))
        .route("/api/admin/system", get(admin_system).fallback(not_found))
        .fallback(not_found)
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let mut routes = admin_routes();
    if state.metrics.is_some() {
        routes = routes.route("/metrics", get(metrics).fallback(not_found));
    }
    with_middleware(routes, state)
}

/// Wrap routes in the service middleware stack and bind state.
///
/// Order, outermost first: logging and metrics, pretty JSON, CORS, error
/// rendering, panic capture.
pub fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(request_trace_layer())
        .layer(from_fn(track_requests))
        .layer(from_fn(pretty_json))
        .layer(cors_layer(&state.config))
        .layer(from_fn_with_state(state.clone(), render_errors))
        .layer(CatchPanicLayer::custom(panic_response));

    routes.layer(middleware).with_state(state)
}
