//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process arguments
//!     → cli.rs (clap parse)
//!     → validation.rs (port range, origin URL)
//!     → ProxyConfig (validated, immutable)
//!     → handed to lifecycle::startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated; there is no reload
//! - `--clear-cache` short-circuits before port/origin validation
//! - Validation errors are typed so the caller picks the exit code

pub mod cli;
pub mod schema;
pub mod validation;

pub use cli::{Cli, Command};
pub use schema::{ObservabilityConfig, ProxyConfig, UpstreamConfig};
pub use validation::ConfigError;
