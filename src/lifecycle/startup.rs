//! Startup orchestration.
//!
//! # Responsibilities
//! - Run the one-shot `--clear-cache` operation
//! - Initialize metrics, bind the listener, start serving
//! - Translate OS signals into a graceful shutdown
//!
//! Any startup error is fatal; the listener is bound last.

use thiserror::Error;
use tokio::net::TcpListener;

use crate::cache::CacheStore;
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Fatal errors while starting or running the server.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Clear a freshly created store and return how many entries were removed.
///
/// The cache only lives inside a serving process, so this always reports 0.
pub fn clear_cache() -> usize {
    let cache = CacheStore::new();
    tracing::info!("Clearing cache");
    let cleared = cache.clear();
    tracing::info!(cleared, "Cache cleared");
    cleared
}

/// Serve until Ctrl+C / SIGTERM.
pub async fn serve(config: ProxyConfig) -> Result<(), StartupError> {
    tracing::info!(
        port = config.port,
        origin = %config.origin,
        insecure_upstream = config.upstream.accept_invalid_certs,
        "Configuration loaded"
    );

    if let Some(addr) = config.observability.metrics_address {
        metrics::init_metrics(addr);
    }

    let cache = CacheStore::new();
    let server = HttpServer::new(config.clone(), cache)?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    tracing::info!(address = %addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    server.run(listener, signal).await.map_err(StartupError::Serve)
}
