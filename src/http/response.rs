//! Response handling and transformation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from upstream responses
//! - Mark every response with `X-Cache: HIT` or `X-Cache: MISS`
//! - Rebuild client responses from cache entries
//! - Map proxy errors to generic client responses

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};

use crate::cache::CacheEntry;
use crate::error::ProxyError;

/// Cache outcome marker header.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Transport-scoped headers that are never relayed or cached.
pub const HOP_BY_HOP_HEADERS: [HeaderName; 2] = [header::CONNECTION, header::TRANSFER_ENCODING];

/// Whether a response was served from the cache or fetched from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }

    /// Set the `X-Cache` header, replacing any value the origin sent.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(X_CACHE, HeaderValue::from_static(self.as_str()));
    }
}

/// Copy upstream headers without the hop-by-hop ones.
///
/// Multi-valued headers keep all their values in order.
pub fn sanitize_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    for name in HOP_BY_HOP_HEADERS.iter() {
        headers.remove(name);
    }
    headers
}

/// Build a response with the given parts and cache marker.
pub fn with_parts(status: StatusCode, mut headers: HeaderMap, body: Body, cache: CacheStatus) -> Response {
    cache.apply(&mut headers);
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Serve a cache entry: stored status and headers, `X-Cache: HIT`, body in one chunk.
pub fn cached_response(entry: &CacheEntry) -> Response {
    with_parts(
        entry.status(),
        entry.headers().clone(),
        Body::from(entry.body().clone()),
        CacheStatus::Hit,
    )
}

/// Synthesized failure response for a request that never reached a usable upstream response.
pub fn error_response(err: &ProxyError) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    with_parts(
        err.status_code(),
        headers,
        Body::from(err.client_message()),
        CacheStatus::Miss,
    )
}
