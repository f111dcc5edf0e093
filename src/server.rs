//! Process lifecycle: cache connection, listener, serving and shutdown.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::cache::CacheConnection;
use crate::config::Config;
use crate::error::Result;

/// A started admin service: cache connected and listener bound.
#[derive(Debug)]
pub struct AdminServer {
    state: AppState,
    listener: TcpListener,
    shutdown_timeout: Duration,
}

impl AdminServer {
    /// Connect the cache and bind the HTTP listener.
    ///
    /// Any failure here is a startup failure. If binding fails after the
    /// cache connected, the cache is disconnected before returning.
    pub async fn start(
        config: Config,
        cache: Arc<dyn CacheConnection>,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self> {
        info!("Connecting to {}...", cache.name());
        cache.connect().await?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                if let Err(err) = cache.disconnect().await {
                    warn!("Failed to disconnect from {}: {}", cache.name(), err);
                }
                return Err(e.into());
            }
        };

        let port = listener.local_addr()?.port();
        info!("Admin service starting on port {}", port);
        info!("Health check: http://localhost:{}/health", port);
        info!("Admin API: http://localhost:{}/api/admin/*", port);
        info!("Environment: {}", config.environment());

        let shutdown_timeout = config.shutdown_timeout();
        let mut state = AppState::new(config, cache);
        if let Some(handle) = metrics {
            state = state.with_metrics(handle);
        }

        Ok(Self {
            state,
            listener,
            shutdown_timeout,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve requests until `shutdown` resolves, then disconnect the cache.
    ///
    /// In-flight requests get at most the configured drain timeout after the
    /// shutdown future resolves. Disconnect failures are logged only.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            state,
            listener,
            shutdown_timeout,
        } = self;
        let cache = state.cache.clone();
        let router = create_router(state);

        let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutting down admin service...");
                let _ = signalled_tx.send(());
            })
            .into_future();
        tokio::pin!(server);

        let served = tokio::select! {
            biased;
            result = &mut server => result,
            _ = signalled_rx => match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "In-flight requests still running after {:?}, abandoning them",
                        shutdown_timeout
                    );
                    Ok(())
                }
            },
        };

        if let Err(e) = cache.disconnect().await {
            warn!("Failed to disconnect from {}: {}", cache.name(), e);
        }

        served?;
        info!("Admin service stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MockCache;
    use crate::error::ServiceError;

    fn ephemeral_config() -> Config {
        Config {
            port: 0,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn start_connects_cache_before_binding() {
        let cache = MockCache::new();
        let server = AdminServer::start(ephemeral_config(), Arc::new(cache.clone()), None)
            .await
            .unwrap();

        assert_eq!(cache.connect_calls(), 1);
        assert!(cache.is_connected().await);
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn start_fails_when_cache_connect_fails() {
        let cache = MockCache::failing_connect();
        let result =
            AdminServer::start(ephemeral_config(), Arc::new(cache.clone()), None).await;

        assert!(matches!(result, Err(ServiceError::Cache(_))));
        assert_eq!(cache.disconnect_calls(), 0);
    }

    #[tokio::test]
    async fn bind_failure_disconnects_cache() {
        let taken = TcpListener::bind("0.0.0.0:0").await.unwrap();
        let config = Config {
            port: taken.local_addr().unwrap().port(),
            ..Config::default()
        };
        let cache = MockCache::new();

        let result = AdminServer::start(config, Arc::new(cache.clone()), None).await;

        assert!(matches!(result, Err(ServiceError::Io(_))));
        assert_eq!(cache.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn run_disconnects_after_shutdown() {
        let cache = MockCache::new();
        let server = AdminServer::start(ephemeral_config(), Arc::new(cache.clone()), None)
            .await
            .unwrap();

        server.run(async {}).await.unwrap();

        assert_eq!(cache.disconnect_calls(), 1);
        assert!(!cache.is_connected().await);
    }

    #[tokio::test]
    async fn hung_request_is_abandoned_after_drain_timeout() {
        use tokio::io::AsyncWriteExt;
        use tokio::net::TcpStream;
        use tokio::time::Instant;

        let config = Config {
            port: 0,
            shutdown_timeout_secs: 1,
            ..Config::default()
        };
        let cache = MockCache::new();
        let server = AdminServer::start(config, Arc::new(cache.clone()), None)
            .await
            .unwrap();
        let port = server.local_addr().unwrap().port();

        let (stop, stopped) = oneshot::channel::<()>();
        let running = tokio::spawn(server.run(async move {
            let _ = stopped.await;
        }));

        // Headers never terminated, so the request can not complete.
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: x\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = Instant::now();
        stop.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(3), running)
            .await
            .expect("run did not return after the drain timeout")
            .unwrap();

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_millis(2500));
        assert_eq!(cache.disconnect_calls(), 1);
        drop(stream);
    }

    #[tokio::test]
    async fn disconnect_failure_does_not_fail_shutdown() {
        let cache = MockCache::with_config(crate::cache::mock::MockCacheConfig {
            fail_disconnect: true,
            ..Default::default()
        });
        let server = AdminServer::start(ephemeral_config(), Arc::new(cache.clone()), None)
            .await
            .unwrap();

        assert!(server.run(async {}).await.is_ok());
        assert_eq!(cache.disconnect_calls(), 1);
    }
}
