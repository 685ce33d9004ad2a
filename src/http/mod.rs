//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all route)
//!     → proxy::Dispatcher (cache lookup / forward)
//!     → response.rs (sanitize headers, X-Cache marker)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{CacheStatus, X_CACHE};
pub use server::HttpServer;
