//! Caching proxy pipeline.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → dispatcher.rs (compute key, consult cache)
//!         hit  → http::response (stored entry, X-Cache: HIT)
//!         miss → forwarder.rs (equivalent request to the origin)
//!              → collector.rs (relay body to client + buffer)
//!              → cache store (on clean completion only)
//! ```
//!
//! # Design Decisions
//! - No retries and no request coalescing; concurrent misses all forward
//! - A response is cached only after its body finished without error
//! - Every status code is cached, error statuses included

pub mod collector;
pub mod dispatcher;
pub mod forwarder;

pub use collector::ResponseCollector;
pub use dispatcher::Dispatcher;
pub use forwarder::Forwarder;
