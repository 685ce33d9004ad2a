//! Caching Forwarding Proxy
//!
//! Forwards every request to a single origin and keeps each response in
//! memory, keyed by method and path. Repeated requests are answered from
//! memory without contacting the origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                  CACHING PROXY                   │
//!                     │                                                  │
//!   Client Request    │  ┌─────────┐    ┌────────────┐    ┌───────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│ dispatcher │───▶│   cache   │  │
//!                     │  │ server  │    │  (key)     │◀───│   store   │  │
//!                     │  └─────────┘    └─────┬──────┘    └─────▲─────┘  │
//!                     │                  miss │                 │ put    │
//!                     │                       ▼                 │        │
//!   Client Response   │  ┌─────────┐    ┌────────────┐    ┌─────┴─────┐  │
//!   ◀─────────────────┼──│response │◀───│ collector  │◀───│ forwarder │◀─┼── Origin
//!                     │  │ headers │    │ (tee body) │    │ (reqwest) │  │
//!                     │  └─────────┘    └────────────┘    └───────────┘  │
//!                     └──────────────────────────────────────────────────┘
//! ```
//!
//! # Exit codes
//! - `0`: `--clear-cache`, help/version, or graceful shutdown
//! - `1`: missing/invalid arguments or a startup failure

use clap::Parser;
use std::process::ExitCode;

use caching_proxy::config::{Cli, Command};
use caching_proxy::lifecycle::startup;
use caching_proxy::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let command = match cli.into_command() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::ClearCache => {
            let cleared = startup::clear_cache();
            println!("Cleared {} cached entries", cleared);
            ExitCode::SUCCESS
        }
        Command::Serve(config) => {
            tracing::info!("caching-proxy v{} starting", env!("CARGO_PKG_VERSION"));
            match startup::serve(config).await {
                Ok(()) => {
                    tracing::info!("Shutdown complete");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!(error = %e, "Fatal error");
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
