//! Server startup, background maintenance and shutdown
//!
//! The server owns the risk engine. A background task sweeps expired cache
//! entries, and a shutdown signal drains in-flight requests for at most the
//! configured grace period before the engine is stopped.

use std::future::{Future, IntoFuture};
use std::net::{AddrParseError, SocketAddr};
use std::sync::{Arc, Weak};
use std::time::Duration;

use axum::Router;
use risk_engine::{EngineError, RiskEngine};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::routes::{self, AppState};

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// Shared risk engine
    engine: Arc<RiskEngine>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a new server instance, starting the risk engine
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if the engine cannot be built from
    /// `config.engine`.
    pub fn new(config: ServerConfig) -> Result<Self, EngineError> {
        let engine = Arc::new(RiskEngine::new(config.engine.clone())?);
        let config = Arc::new(config);
        let router = routes::build_router(AppState::new(config.clone(), engine.clone()));

        Ok(Self {
            config,
            engine,
            router,
        })
    }

    /// Get the socket address the server will bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.config.socket_addr().parse()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server until Ctrl-C or SIGTERM
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = self
            .socket_addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let listener = TcpListener::bind(addr).await?;
        self.run_with_listener(listener).await
    }

    /// Run the server on an already bound listener until Ctrl-C or SIGTERM
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `shutdown` resolves
    ///
    /// In-flight requests get [`ServerConfig::shutdown_timeout`] to finish;
    /// after that the server stops regardless.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Server {
            config,
            engine,
            router,
        } = self;

        let addr = listener.local_addr()?;
        tracing::info!("Server listening on {}", addr);

        let sweeper = config
            .cache_purge_interval()
            .map(|every| spawn_cache_sweeper(Arc::downgrade(&engine), every));

        let draining = Arc::new(Notify::new());
        let trigger = draining.clone();
        let serve = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("shutdown signal received, draining requests");
                trigger.notify_one();
            })
            .into_future();

        let grace = config.shutdown_timeout();
        let result = tokio::select! {
            result = serve => result,
            _ = async {
                draining.notified().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(grace_secs = grace.as_secs(), "graceful shutdown timed out");
                Ok(())
            }
        };

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        match Arc::try_unwrap(engine) {
            Ok(engine) => engine.shutdown(),
            Err(_) => tracing::debug!("risk engine still referenced, dropped with last request"),
        }
        result
    }

    /// Create a test server and return the bound address
    ///
    /// This binds to port 0 to get a random available port, starts the server
    /// in a background task, and returns the actual bound address.
    #[cfg(test)]
    pub async fn spawn_test_server(config: ServerConfig) -> (SocketAddr, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Self::new(config).unwrap();
        let handle = tokio::spawn(async move {
            server
                .run_until(listener, std::future::pending())
                .await
                .ok();
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        (addr, handle)
    }
}

/// Periodically drops expired cache entries until the engine goes away
fn spawn_cache_sweeper(engine: Weak<RiskEngine>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(engine) = engine.upgrade() else {
                break;
            };
            engine.purge_expired().await;
        }
    })
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
