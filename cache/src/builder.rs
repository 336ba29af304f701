use crate::error::BuildError;
use crate::handles::QueryCache;
use crate::metrics::Metrics;
use crate::shared::CacheShared;
use crate::store::ShardedStore;

use core::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// The time-to-live applied when none is configured: five minutes.
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(5 * 60);

/// A builder for creating `QueryCache` instances.
pub struct CacheBuilder<K, V, H = ahash::RandomState> {
  pub(crate) shards: usize,
  pub(crate) time_to_live: Duration,
  pub(crate) hasher: H,
  _key_marker: PhantomData<K>,
  _value_marker: PhantomData<V>,
}

// Manual Debug implementation for CacheBuilder.
impl<K, V, H> fmt::Debug for CacheBuilder<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("shards", &self.shards)
      .field("time_to_live", &self.time_to_live)
      .finish_non_exhaustive()
  }
}

// --- General Configuration Methods ---
impl<K, V, H> CacheBuilder<K, V, H> {
  /// Sets the number of concurrent shards to use.
  pub fn shards(mut self, shards: usize) -> Self {
    // Zero is kept as-is so `build` can reject it; anything else is rounded
    // up to a power of two for fast bitwise ANDing.
    self.shards = if shards == 0 { 0 } else { shards.next_power_of_two() };
    self
  }

  /// Sets the time-to-live for all entries in the cache.
  pub fn time_to_live(mut self, duration: Duration) -> Self {
    self.time_to_live = duration;
    self
  }
}

// --- Default Constructor ---
impl<K, V, H: BuildHasher + Default> CacheBuilder<K, V, H> {
  /// Creates a new `CacheBuilder` with default settings.
  pub fn new() -> Self {
    Self {
      shards: (num_cpus::get() * 4).max(1).next_power_of_two(),
      time_to_live: DEFAULT_TIME_TO_LIVE,
      hasher: H::default(),
      _key_marker: PhantomData,
      _value_marker: PhantomData,
    }
  }
}

impl<K, V> Default for CacheBuilder<K, V, ahash::RandomState> {
  fn default() -> Self {
    Self::new()
  }
}

// --- Build Methods ---
impl<K, V, H> CacheBuilder<K, V, H>
where
  K: Eq + Hash,
  H: BuildHasher + Clone,
{
  /// Sets the hasher for the cache.
  pub fn hasher(mut self, hasher: H) -> Self {
    self.hasher = hasher;
    self
  }

  /// Builds a `QueryCache`.
  pub fn build(self) -> Result<QueryCache<K, V, H>, BuildError> {
    self.validate()?;

    let shared = CacheShared {
      store: ShardedStore::new(self.shards, self.hasher),
      metrics: Metrics::new(),
      time_to_live: self.time_to_live,
    };

    Ok(QueryCache {
      shared: Arc::new(shared),
    })
  }

  /// Validates the builder configuration.
  pub(crate) fn validate(&self) -> Result<(), BuildError> {
    if self.time_to_live.is_zero() {
      return Err(BuildError::ZeroTimeToLive);
    }
    if self.shards == 0 {
      return Err(BuildError::ZeroShards);
    }
    Ok(())
  }
}
