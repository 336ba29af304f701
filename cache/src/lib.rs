//! A fingerprinted query cache with a fixed time-to-live.
//!
//! Results of remote queries are stored under a deterministic key (the
//! query's fingerprint) and served until their time-to-live elapses.
//!
//! # Features
//! - **Lazy Expiry**: Entries are checked against the TTL on read; there is no
//!   background sweep and no capacity eviction.
//! - **Sharded**: Keys are spread over independently locked shards.
//! - **Non-Clone Support**: Stores values in an `Arc<V>`, avoiding `V: Clone` bounds.
//! - **Observability**: `stats()` lists the stored keys, `metrics()` exposes
//!   hit/miss counters.
//!
//! Time is read from `tokio::time::Instant`, so a paused Tokio clock controls
//! expiry in tests.

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod handles;
pub mod metrics;

// Internal, crate-only modules
mod entry;
mod shared;
mod store;

// Re-export the primary user-facing types for convenience
pub use builder::{CacheBuilder, DEFAULT_TIME_TO_LIVE};
pub use error::BuildError;
pub use handles::{CacheStats, QueryCache};
pub use metrics::MetricsSnapshot;
