//! Tee of the upstream body into the client stream and a cache buffer.

use axum::http::{HeaderMap, StatusCode};
use bytes::{Bytes, BytesMut};
use futures_util::stream::{BoxStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::cache::{CacheEntry, CacheKey, CacheStore};
use crate::observability::metrics;

/// Status and headers waiting for the body to complete.
struct Pending {
    key: CacheKey,
    status: StatusCode,
    headers: HeaderMap,
}

/// Streams the upstream body to the client while buffering it.
///
/// Every chunk is yielded unchanged and appended to the buffer in delivery
/// order. The buffered response is stored under its key once the body is
/// complete: when `expected_len` bytes have arrived, or when the upstream
/// ends cleanly if the length is unknown. The server stops polling a
/// fixed-length body after its last byte, so the length check cannot wait
/// for the end of the stream. An upstream error, or the client dropping the
/// stream before the body is complete, discards the buffer without touching
/// the cache.
pub struct ResponseCollector<E> {
    upstream: BoxStream<'static, Result<Bytes, E>>,
    buffer: BytesMut,
    expected_len: Option<u64>,
    pending: Option<Pending>,
    cache: CacheStore,
}

impl<E> ResponseCollector<E> {
    /// A collector for a response whose body is `expected_len` bytes long,
    /// or of unknown length when `None`. A zero-length body is cached
    /// immediately.
    pub fn new(
        key: CacheKey,
        status: StatusCode,
        headers: HeaderMap,
        upstream: BoxStream<'static, Result<Bytes, E>>,
        expected_len: Option<u64>,
        cache: CacheStore,
    ) -> Self {
        let mut collector = Self {
            upstream,
            buffer: BytesMut::new(),
            expected_len,
            pending: Some(Pending {
                key,
                status,
                headers,
            }),
            cache,
        };
        if expected_len == Some(0) {
            collector.complete();
        }
        collector
    }

    fn is_complete(&self) -> bool {
        self.expected_len
            .is_some_and(|len| self.buffer.len() as u64 >= len)
    }

    fn complete(&mut self) {
        if let Some(pending) = self.pending.take() {
            let body = self.buffer.split().freeze();
            tracing::debug!(
                key = %pending.key,
                status = %pending.status,
                body_bytes = body.len(),
                "Origin response complete, caching"
            );
            self.cache
                .put(pending.key, CacheEntry::new(pending.status, pending.headers, body));
        }
    }
}

impl<E: std::fmt::Display> Stream for ResponseCollector<E> {
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.pending.is_none() {
            return Poll::Ready(None);
        }

        match this.upstream.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                this.buffer.extend_from_slice(&chunk);
                if this.is_complete() {
                    this.complete();
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                if let Some(pending) = this.pending.take() {
                    tracing::warn!(
                        key = %pending.key,
                        received_bytes = this.buffer.len(),
                        error = %e,
                        "Origin response stream failed, not caching"
                    );
                }
                this.buffer.clear();
                metrics::record_upstream_error("stream");
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if this.expected_len.is_none() {
                    this.complete();
                } else if let Some(pending) = this.pending.take() {
                    tracing::warn!(
                        key = %pending.key,
                        received_bytes = this.buffer.len(),
                        expected_bytes = this.expected_len,
                        "Origin response ended short of its length, not caching"
                    );
                    this.buffer.clear();
                }
                Poll::Ready(None)
            }
        }
    }
}

impl<E> Drop for ResponseCollector<E> {
    fn drop(&mut self) {
        if let Some(pending) = &self.pending {
            tracing::debug!(
                key = %pending.key,
                received_bytes = self.buffer.len(),
                "Client stream dropped before origin response completed, not caching"
            );
        }
    }
}
