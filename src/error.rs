//! Unified error types for the admin service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use strum::IntoStaticStr;
use thiserror::Error;

use crate::api::envelope::ApiResponse;

/// Unified error type for service startup and lifecycle.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cache connection error.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cache connection errors.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis client error.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Connection could not be established.
    #[error("connection to {name} failed: {reason}")]
    ConnectionFailed {
        /// Cache backend name.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// Operation requires an open connection.
    #[error("{0} is not connected")]
    NotConnected(String),
}

/// Machine-readable error codes carried in the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No route matched the request.
    NotFound,
    /// A handler failed.
    InternalServerError,
}

/// Errors returned from HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No matching route.
    #[error("route not found")]
    NotFound,

    /// Unhandled failure inside a handler.
    #[error("{0}")]
    Internal(String),
}

/// Message of an internal error, attached to the response so the error
/// rendering middleware can log it and decide whether to expose it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl ApiError {
    /// Build an internal error from anything displayable.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound => ErrorCode::NotFound,
            Self::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    /// Client-facing message. Internal failures are never echoed here.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::NotFound => "Route not found",
            Self::Internal(_) => "An unexpected error occurred",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::failure(self.code(), self.public_message());
        let mut response = (self.status(), Json(body)).into_response();

        if let Self::Internal(message) = self {
            response
                .extensions_mut()
                .insert(InternalErrorDetail(message));
        }

        response
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
