//! Request-path error definitions.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while forwarding a request to the origin.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Origin + request path did not form a valid URL.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[from] url::ParseError),

    /// The inbound request body failed while it was streamed to the origin.
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] reqwest::Error),

    /// The upstream connection or request failed.
    #[error("upstream request failed: {0}")]
    Forwarding(#[source] reqwest::Error),

    /// The upstream HTTP client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProxyError {
    /// Status code reported to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::RequestBody(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Generic body reported to the client. Upstream details stay in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            ProxyError::RequestBody(_) => "Error: Could not read request body",
            _ => "Error: Could not connect to origin server",
        }
    }
}

/// Result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;
