//! Configuration schema definitions.
//!
//! The validated, immutable configuration produced at startup. Nothing here
//! changes after the server begins serving.

use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

/// Root configuration for the caching proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Listen port (1..=65535), bound on all interfaces.
    pub port: u16,

    /// Upstream base URL every request is forwarded to.
    pub origin: Url,

    /// Upstream client settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Configuration with default upstream and observability settings.
    pub fn new(port: u16, origin: Url) -> Self {
        Self {
            port,
            origin,
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    /// Address the listener binds to.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

/// Upstream (origin-facing) client configuration.
#[derive(Debug, Clone, Default)]
pub struct UpstreamConfig {
    /// Skip TLS certificate validation toward the origin.
    /// Off unless explicitly requested.
    pub accept_invalid_certs: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    /// Prometheus exporter bind address; no exporter when `None`.
    pub metrics_address: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::new(3000, Url::parse("http://dummyjson.com").unwrap());
        assert!(!config.upstream.accept_invalid_certs);
        assert!(config.observability.metrics_address.is_none());
        assert_eq!(config.bind_address().to_string(), "0.0.0.0:3000");
    }
}
