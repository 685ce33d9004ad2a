//! In-memory response cache.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → key.rs (method + path-and-query → CacheKey)
//!     → store.rs (lookup)
//!         hit  → entry.rs (immutable snapshot served as-is)
//!         miss → proxy layer fetches, collector builds CacheEntry → store.rs (put)
//! ```
//!
//! # Design Decisions
//! - Entries are shared as `Arc<CacheEntry>` and never mutated after insert
//! - No expiry, no size cap, no eviction
//! - The store is an owned handle injected into the dispatcher, not a global

pub mod entry;
pub mod key;
pub mod store;

pub use entry::CacheEntry;
pub use key::CacheKey;
pub use store::CacheStore;
