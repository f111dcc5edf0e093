//! Integration tests for the admin service.
//!
//! Each test starts the real server on an ephemeral port with a mock cache
//! and talks to it over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use admin_service::cache::{CacheConnection, MockCache};
use admin_service::config::Config;
use admin_service::{AdminServer, ServiceError};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct RunningServer {
    base_url: String,
    cache: MockCache,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<admin_service::Result<()>>,
}

impl RunningServer {
    async fn shutdown(self) -> (MockCache, admin_service::Result<()>) {
        let _ = self.stop.send(());
        let result = self.handle.await.expect("server task panicked");
        (self.cache, result)
    }
}

async fn spawn_server(node_env: Option<&str>) -> RunningServer {
    let config = Config {
        port: 0,
        node_env: node_env.map(str::to_string),
        ..Config::default()
    };
    let cache = MockCache::new();
    let server = AdminServer::start(config, Arc::new(cache.clone()), None)
        .await
        .expect("server should start");

    let port = server.local_addr().unwrap().port();
    let base_url = format!("http://{}", SocketAddr::from(([127, 0, 0, 1], port)));

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(async move {
        let _ = stopped.await;
    }));

    RunningServer {
        base_url,
        cache,
        stop,
        handle,
    }
}

#[tokio::test]
async fn serves_health_over_http() {
    let server = spawn_server(None).await;

    let response = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["endpoints"], json!(["users", "analytics", "system"]));

    server.shutdown().await.1.unwrap();
}

#[tokio::test]
async fn admin_routes_return_stub_envelopes() {
    let server = spawn_server(None).await;
    let client = reqwest::Client::new();

    for (path, data) in [
        ("users", json!([])),
        ("analytics", json!({})),
        ("system", json!({})),
    ] {
        let response = client
            .get(format!("{}/api/admin/{}", server.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], data);
    }

    server.shutdown().await.1.unwrap();
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let server = spawn_server(None).await;

    let response = reqwest::Client::new()
        .delete(format!("{}/api/admin/everything", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    server.shutdown().await.1.unwrap();
}

#[tokio::test]
async fn development_mirrors_request_origin() {
    let server = spawn_server(Some("development")).await;

    let response = reqwest::Client::new()
        .get(format!("{}/health", server.base_url))
        .header("Origin", "https://dashboard.internal")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"]
            .to_str()
            .unwrap(),
        "https://dashboard.internal"
    );

    server.shutdown().await.1.unwrap();
}

#[tokio::test]
async fn shutdown_disconnects_cache() {
    let server = spawn_server(None).await;
    assert!(server.cache.is_connected().await);

    let (cache, result) = server.shutdown().await;

    assert!(result.is_ok());
    assert_eq!(cache.connect_calls(), 1);
    assert_eq!(cache.disconnect_calls(), 1);
    assert!(!cache.is_connected().await);
}

#[tokio::test]
async fn cache_failure_aborts_startup() {
    let cache = MockCache::failing_connect();
    let config = Config {
        port: 0,
        ..Config::default()
    };

    let result = AdminServer::start(config, Arc::new(cache.clone()), None).await;

    assert!(matches!(result, Err(ServiceError::Cache(_))));
    assert_eq!(cache.connect_calls(), 1);
}
