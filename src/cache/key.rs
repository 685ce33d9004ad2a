//! Cache key derivation.

use axum::http::{Method, Request};

/// Identifies a cached response: `{method}:{path-and-query}`.
///
/// The path is taken verbatim from the request target, query string included.
/// Headers and body never participate, so requests that differ only there
/// share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from a method and a raw path-and-query.
    pub fn new(method: &Method, path_and_query: &str) -> Self {
        Self(format!("{}:{}", method, path_and_query))
    }

    /// Derive the key for an inbound request.
    pub fn for_request<B>(request: &Request<B>) -> Self {
        Self::new(request.method(), request_target(request))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path and query of the request exactly as received (`/` when absent).
pub fn request_target<B>(request: &Request<B>) -> &str {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
}
