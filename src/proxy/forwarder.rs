//! Upstream request forwarding.
//!
//! # Responsibilities
//! - Map an inbound request target onto the configured origin
//! - Copy method and headers verbatim (including `Host`)
//! - Stream the request body through when one was sent
//! - Pick plain or TLS transport from the origin scheme
//!
//! # Design Decisions
//! - No retries; a failure is reported once to the dispatcher
//! - Redirects are relayed to the client, never followed here
//! - Certificate validation is only disabled on explicit request

use axum::{
    body::{Body, HttpBody},
    http::Request,
};
use std::error::Error as _;
use url::Url;

use crate::cache::key::request_target;
use crate::config::UpstreamConfig;
use crate::error::{ProxyError, ProxyResult};

/// Issues requests against the single configured origin.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    origin: Url,
}

impl Forwarder {
    /// Create a forwarder for `origin`.
    pub fn new(origin: Url, config: &UpstreamConfig) -> ProxyResult<Self> {
        if config.accept_invalid_certs {
            tracing::warn!(
                origin = %origin,
                "TLS certificate validation toward the origin is DISABLED"
            );
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(ProxyError::Client)?;

        Ok(Self { client, origin })
    }

    /// Origin with trailing slashes trimmed, followed by the request target.
    pub fn target_url(&self, path_and_query: &str) -> ProxyResult<Url> {
        let base = self.origin.as_str().trim_end_matches('/');
        let url = if path_and_query.starts_with('/') {
            format!("{}{}", base, path_and_query)
        } else {
            format!("{}/{}", base, path_and_query)
        };
        Ok(Url::parse(&url)?)
    }

    /// Send the equivalent of `request` to the origin.
    ///
    /// The request body is streamed to the origin as it arrives. A request
    /// without a body is sent without one. Resolves once the upstream status
    /// line and headers have arrived; the response body is left for the
    /// caller to stream.
    pub async fn forward(&self, request: Request<Body>) -> ProxyResult<reqwest::Response> {
        let url = self.target_url(request_target(&request))?;
        let (parts, body) = request.into_parts();
        let has_body = !body.is_end_stream();

        tracing::debug!(
            method = %parts.method,
            url = %url,
            has_body,
            "Forwarding request to origin"
        );

        let mut upstream = self
            .client
            .request(parts.method, url)
            .headers(parts.headers);
        if has_body {
            upstream = upstream.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        upstream.send().await.map_err(classify)
    }
}

/// Tell a failed inbound body apart from a failed origin exchange.
fn classify(err: reqwest::Error) -> ProxyError {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<axum::Error>() {
            return ProxyError::RequestBody(err);
        }
        source = cause.source();
    }
    ProxyError::Forwarding(err)
}
