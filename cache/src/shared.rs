use crate::metrics::Metrics;
use crate::store::ShardedStore;

use std::fmt;
use std::time::Duration;

/// The internal, thread-safe core of the cache.
pub(crate) struct CacheShared<K, V, H> {
  pub(crate) store: ShardedStore<K, V, H>,
  pub(crate) metrics: Metrics,
  pub(crate) time_to_live: Duration,
}

impl<K, V, H> fmt::Debug for CacheShared<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("time_to_live", &self.time_to_live)
      .field("store", &self.store)
      .field("metrics", &self.metrics.snapshot())
      .finish()
  }
}
