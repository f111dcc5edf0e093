//! Application configuration loaded from environment variables.

use std::time::Duration;

use axum::http::HeaderValue;
use serde::Deserialize;

/// Environment name that enables permissive CORS and verbose error details.
pub const DEVELOPMENT: &str = "development";

/// Origin allowed when `CORS_ALLOWED_ORIGINS` is not set.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name (`NODE_ENV`).
    #[serde(default)]
    pub node_env: Option<String>,

    /// Seconds to wait for in-flight requests after a shutdown signal.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    // === CORS ===
    /// Comma-separated list of allowed origins outside development.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    // === Cache ===
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    // === Observability ===
    /// Expose Prometheus metrics on `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_port() -> u16 {
    3002
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            node_env: None,
            shutdown_timeout_secs: default_shutdown_timeout(),
            cors_allowed_origins: None,
            redis_url: default_redis_url(),
            metrics_enabled: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The binary reads `.env` once at startup, before this is called.
    pub fn load() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        for origin in self.cors_origins() {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(format!(
                    "CORS_ALLOWED_ORIGINS entry '{}' must start with http:// or https://",
                    origin
                ));
            }
            if HeaderValue::from_str(&origin).is_err() {
                return Err(format!(
                    "CORS_ALLOWED_ORIGINS entry '{}' is not a valid header value",
                    origin
                ));
            }
        }

        if self.shutdown_timeout_secs == 0 {
            return Err("SHUTDOWN_TIMEOUT_SECS must be greater than 0".to_string());
        }

        let scheme_ok = ["redis://", "rediss://", "unix://"]
            .iter()
            .any(|scheme| self.redis_url.starts_with(scheme));
        if !scheme_ok {
            return Err("REDIS_URL must start with redis://, rediss:// or unix://".to_string());
        }

        Ok(())
    }

    /// Whether development policy (any CORS origin, error details) applies.
    pub fn is_development(&self) -> bool {
        self.node_env.as_deref() == Some(DEVELOPMENT)
    }

    /// Environment name for display.
    pub fn environment(&self) -> &str {
        self.node_env.as_deref().unwrap_or("production")
    }

    /// Origins allowed outside development.
    ///
    /// Entries are trimmed and empty ones dropped. Falls back to
    /// [`DEFAULT_ALLOWED_ORIGIN`] when nothing usable is configured.
    pub fn cors_origins(&self) -> Vec<String> {
        let origins: Vec<String> = self
            .cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() {
            vec![DEFAULT_ALLOWED_ORIGIN.to_string()]
        } else {
            origins
        }
    }

    /// Drain bound for in-flight requests during shutdown.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
