use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// A container for a cached query result and the moment it was stored.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  /// The user's value, wrapped in an Arc for shared ownership.
  value: Arc<V>,
  stored_at: Instant,
}

impl<V> CacheEntry<V> {
  /// Creates a new `CacheEntry` stamped with the current time.
  pub(crate) fn new(value: Arc<V>) -> Self {
    Self {
      value,
      stored_at: Instant::now(),
    }
  }

  /// Returns a clone of the `Arc` containing the value.
  #[inline]
  pub(crate) fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  #[inline]
  pub(crate) fn age(&self) -> Duration {
    Instant::now().saturating_duration_since(self.stored_at)
  }

  /// An entry is valid only while `now - stored_at < ttl`.
  #[inline]
  pub(crate) fn is_expired(&self, ttl: Duration) -> bool {
    self.age() >= ttl
  }
}
