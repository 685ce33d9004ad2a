//! Configuration validation.
//!
//! # Responsibilities
//! - Check presence of required values (`--port`, `--origin`)
//! - Validate value ranges (port in 1..=65535)
//! - Validate the origin is an absolute http(s) URL
//!
//! Validation is a pure function of the raw argument text.

use thiserror::Error;
use url::Url;

/// Error type for configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--port is required")]
    MissingPort,

    #[error("--port must be a number between 1 and 65535 (you provided: {0})")]
    InvalidPort(String),

    #[error("--origin is required")]
    MissingOrigin,

    #[error("--origin must be a valid URL i.e. http://dummyjson.com (you provided: {value}): {reason}")]
    InvalidOrigin { value: String, reason: String },
}

/// Validate the listen port.
pub fn validate_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    let raw = raw.ok_or(ConfigError::MissingPort)?;
    match raw.trim().parse::<i64>() {
        Ok(port) if (1..=65535).contains(&port) => Ok(port as u16),
        _ => Err(ConfigError::InvalidPort(raw.to_string())),
    }
}

/// Validate the origin base URL.
pub fn validate_origin(raw: Option<&str>) -> Result<Url, ConfigError> {
    let raw = raw.ok_or(ConfigError::MissingOrigin)?;
    let invalid = |reason: String| ConfigError::InvalidOrigin {
        value: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{}`", other))),
    }
    if !url.has_host() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
