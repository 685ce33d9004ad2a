//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router; every method and request target reaches the proxy handler
//! - Wire up middleware (tracing, panic isolation)
//! - Serve on a listener until shutdown is signalled

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    response::Response,
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::key::request_target;
use crate::cache::CacheStore;
use crate::config::ProxyConfig;
use crate::error::ProxyResult;
use crate::http::response::{self, CacheStatus};
use crate::lifecycle::ShutdownSignal;
use crate::proxy::{Dispatcher, Forwarder};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the caching proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    cache: CacheStore,
}

impl HttpServer {
    /// Create a new HTTP server serving from `cache`.
    pub fn new(config: ProxyConfig, cache: CacheStore) -> ProxyResult<Self> {
        let forwarder = Forwarder::new(config.origin.clone(), &config.upstream)?;
        let dispatcher = Arc::new(Dispatcher::new(cache.clone(), forwarder));

        let router = Self::build_router(AppState { dispatcher });
        Ok(Self {
            router,
            config,
            cache,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        // No routes: asterisk-form and other non-path targets must reach the handler too
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.origin,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!(cached_entries = self.cache.len(), "HTTP server stopped");
        Ok(())
    }

    /// A clone of the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }
}

/// Catch-all handler: every method and path goes through the dispatcher.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let span = tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request_target(&request),
    );
    state.dispatcher.dispatch(request).instrument(span).await
}

/// Answer a panicking request with a 500 instead of dropping the connection.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Request handler panicked");

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response::with_parts(
        StatusCode::INTERNAL_SERVER_ERROR,
        headers,
        Body::from("Error: Internal proxy error"),
        CacheStatus::Miss,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::X_CACHE;
    use tower::ServiceExt;
    use url::Url;

    /// An origin address nothing listens on.
    async fn closed_origin() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_origin_returns_500_without_caching() {
        let origin = closed_origin().await;
        let server = HttpServer::new(ProxyConfig::new(8080, origin), CacheStore::new()).unwrap();

        let request = Request::builder().uri("/x").body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[X_CACHE], "MISS");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"Error: Could not connect to origin server");
        assert!(server.cache().is_empty());
    }

    #[tokio::test]
    async fn test_cached_entry_served_without_origin() {
        use crate::cache::{CacheEntry, CacheKey};
        use axum::http::Method;
        use bytes::Bytes;

        let origin = closed_origin().await;
        let cache = CacheStore::new();
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        cache.put(
            CacheKey::new(&Method::GET, "/x?y=1"),
            CacheEntry::new(StatusCode::OK, headers, Bytes::from_static(b"hello")),
        );

        let server = HttpServer::new(ProxyConfig::new(8080, origin), cache).unwrap();
        let request = Request::builder().uri("/x?y=1").body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_CACHE], "HIT");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn test_asterisk_form_reaches_dispatcher() {
        let origin = closed_origin().await;
        let server = HttpServer::new(ProxyConfig::new(8080, origin), CacheStore::new()).unwrap();

        let request = Request::builder()
            .method("OPTIONS")
            .uri("*")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        // Forwarded (and failed against the closed origin) rather than a router 404
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[X_CACHE], "MISS");
    }

    #[test]
    fn test_panic_response() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[X_CACHE], "MISS");
    }
}
