//! Cross-cutting HTTP middleware: request logging, pretty JSON, CORS, error
//! rendering and panic capture.

use std::any::Any;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, warn, Level};

use super::envelope::ApiResponse;
use super::handlers::AppState;
use crate::config::Config;
use crate::error::{ApiError, InternalErrorDetail};

/// Preflight cache lifetime.
pub const CORS_MAX_AGE: Duration = Duration::from_secs(86400);

/// Query parameter that turns on indented JSON output.
pub const PRETTY_PARAM: &str = "pretty";

/// Request/response logging at INFO, so every request shows up under the
/// default `info` filter.
pub fn request_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Build the CORS layer for the configured environment.
///
/// Development mirrors any request origin back. Elsewhere only exact matches
/// from the allow-list are reflected; other origins get no CORS headers.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.is_development() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            config
                .cors_origins()
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-service-name"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(CORS_MAX_AGE)
}

/// Re-serialize JSON responses with indentation when `?pretty` is present.
pub async fn pretty_json(req: Request, next: Next) -> Response {
    let wants_pretty = req.uri().query().is_some_and(has_pretty_param);
    let response = next.run(req).await;

    if !wants_pretty || !is_json(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => return ApiError::internal(e).into_response(),
    };

    let pretty = serde_json::from_slice::<Value>(&bytes)
        .and_then(|value| serde_json::to_vec_pretty(&value));

    match pretty {
        Ok(pretty) => {
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(pretty))
        }
        Err(e) => {
            warn!("Response declared JSON but did not parse: {}", e);
            Response::from_parts(parts, Body::from(bytes))
        }
    }
}

fn has_pretty_param(query: &str) -> bool {
    query
        .split('&')
        .any(|pair| pair.split('=').next() == Some(PRETTY_PARAM))
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Central error handler.
///
/// Logs every internal error and, in development only, exposes its message
/// as `error.details`.
pub async fn render_errors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let Some(InternalErrorDetail(message)) =
        response.extensions_mut().remove::<InternalErrorDetail>()
    else {
        return response;
    };

    error!("Unhandled error: {}", message);

    if !state.config.is_development() {
        return response;
    }

    let err = ApiError::Internal(message);
    let body = ApiResponse::<()>::failure(err.code(), err.public_message())
        .with_details(err.to_string());

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    (parts, Json(body)).into_response()
}

/// Convert a handler panic into the internal error envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::Internal(message).into_response()
}
