//! Cached response snapshot.

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

/// An immutable snapshot of an upstream response.
///
/// Headers are stored already sanitized and without the `X-Cache` marker.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl CacheEntry {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Stored body. Cloning is a reference-count bump.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
