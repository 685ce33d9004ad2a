//! Per-request orchestration.
//!
//! # States
//! ```text
//! RECEIVED → KEY_COMPUTED → HIT  → SERVED
//!                         → MISS → FORWARDING → FORWARD_ERROR (500, cache untouched)
//!                                             → RESPONDING → COMPLETE (cache written)
//!                                                          → STREAM_ERROR (cache untouched)
//! ```
//!
//! The HIT path never contacts the origin. The MISS path contacts it exactly
//! once. `RESPONDING` and its terminal states are carried out by the
//! [`ResponseCollector`] after the response head has been returned.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
};
use futures_util::StreamExt;
use std::time::Instant;

use crate::cache::{CacheKey, CacheStore};
use crate::http::response::{self, CacheStatus};
use crate::observability::metrics;
use crate::proxy::collector::ResponseCollector;
use crate::proxy::forwarder::Forwarder;

/// Serves inbound requests from the cache or the origin.
#[derive(Debug)]
pub struct Dispatcher {
    cache: CacheStore,
    forwarder: Forwarder,
}

impl Dispatcher {
    pub fn new(cache: CacheStore, forwarder: Forwarder) -> Self {
        Self { cache, forwarder }
    }

    /// Handle one inbound request to completion of its response head.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let key = CacheKey::for_request(&request);
        let method = request.method().clone();

        if let Some(entry) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Cache HIT");
            tracing::info!(
                key = %key,
                status = entry.status().as_u16(),
                "Served from cache"
            );
            metrics::record_request(method.as_str(), entry.status().as_u16(), CacheStatus::Hit.as_str(), start);
            return response::cached_response(&entry);
        }

        tracing::debug!(key = %key, "Cache MISS, forwarding to origin");

        let upstream = match self.forwarder.forward(request).await {
            Ok(upstream) => upstream,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Forwarding to origin failed");
                metrics::record_upstream_error("forward");
                let response = response::error_response(&e);
                metrics::record_request(method.as_str(), response.status().as_u16(), CacheStatus::Miss.as_str(), start);
                return response;
            }
        };

        let status = upstream.status();
        let headers = response::sanitize_headers(upstream.headers());
        let expected_len = body_length(&method, status, upstream.content_length());
        tracing::info!(key = %key, status = status.as_u16(), "Origin responded");

        let collector = ResponseCollector::new(
            key,
            status,
            headers.clone(),
            upstream.bytes_stream().boxed(),
            expected_len,
            self.cache.clone(),
        );

        metrics::record_request(method.as_str(), status.as_u16(), CacheStatus::Miss.as_str(), start);
        response::with_parts(status, headers, Body::from_stream(collector), CacheStatus::Miss)
    }
}

/// Length of the upstream body, when known before it is read.
///
/// HEAD responses and 1xx/204/304 statuses never carry a body, whatever
/// their `Content-Length` says.
fn body_length(method: &Method, status: StatusCode, content_length: Option<u64>) -> Option<u64> {
    if *method == Method::HEAD
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
    {
        Some(0)
    } else {
        content_length
    }
}
