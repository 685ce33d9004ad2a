//! Command-line interface.

use clap::Parser;
use std::net::SocketAddr;

use crate::config::schema::{ObservabilityConfig, ProxyConfig, UpstreamConfig};
use crate::config::validation::{validate_origin, validate_port, ConfigError};

#[derive(Debug, Parser)]
#[command(name = "caching-proxy", version)]
#[command(about = "Forwarding proxy that caches origin responses in memory", long_about = None)]
pub struct Cli {
    /// Port to listen on (1-65535)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub port: Option<String>,

    /// Origin server every request is forwarded to
    #[arg(long, value_name = "URL")]
    pub origin: Option<String>,

    /// Clear the cache and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Disable TLS certificate validation toward the origin
    #[arg(long)]
    pub insecure_upstream: bool,

    /// Expose Prometheus metrics on this address
    #[arg(long, value_name = "ADDR")]
    pub metrics_address: Option<SocketAddr>,
}

/// What the process should do after parsing arguments.
#[derive(Debug)]
pub enum Command {
    /// Clear the (fresh) cache, report, and exit.
    ClearCache,
    /// Serve with the validated configuration.
    Serve(ProxyConfig),
}

impl Cli {
    /// Validate the raw arguments.
    ///
    /// `--clear-cache` is honored before any other validation.
    pub fn into_command(self) -> Result<Command, ConfigError> {
        if self.clear_cache {
            return Ok(Command::ClearCache);
        }

        let port = validate_port(self.port.as_deref())?;
        let origin = validate_origin(self.origin.as_deref())?;

        Ok(Command::Serve(ProxyConfig {
            port,
            origin,
            upstream: UpstreamConfig {
                accept_invalid_certs: self.insecure_upstream,
            },
            observability: ObservabilityConfig {
                metrics_address: self.metrics_address,
            },
        }))
    }
}
