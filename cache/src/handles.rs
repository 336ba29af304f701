use crate::entry::CacheEntry;
use crate::metrics::Metrics;
use crate::shared::CacheShared;
use crate::MetricsSnapshot;

use std::borrow::Borrow;
use std::fmt;
use std::future::Future;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::time::Duration;

/// Observability view of the cache: how many entries it holds and under
/// which keys.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CacheStats<K> {
  pub entries: usize,
  pub keys: Vec<K>,
}

/// A thread-safe query cache handle. Clones share the same storage.
pub struct QueryCache<K, V, H = ahash::RandomState> {
  pub(crate) shared: Arc<CacheShared<K, V, H>>,
}

impl<K, V, H> Clone for QueryCache<K, V, H> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<K, V, H> fmt::Debug for QueryCache<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("QueryCache")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<K, V, H> QueryCache<K, V, H>
where
  K: Eq + Hash,
  H: BuildHasher + Clone,
{
  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }

  pub fn time_to_live(&self) -> Duration {
    self.shared.time_to_live
  }

  /// Looks up a fresh entry for `key`.
  ///
  /// An entry whose age has reached the TTL is removed on the spot and the
  /// lookup is reported as a miss.
  pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let ttl = self.shared.time_to_live;
    let shard = self.shared.store.get_shard(key);

    // Fast path under the read lock.
    {
      let guard = shard.read();
      match guard.get(key) {
        None => {
          Metrics::bump(&self.shared.metrics.misses);
          return None;
        }
        Some(entry) if !entry.is_expired(ttl) => {
          Metrics::bump(&self.shared.metrics.hits);
          return Some(entry.value());
        }
        Some(_) => {}
      }
    }

    // The entry looked expired. Re-check under the write lock since a
    // concurrent insert may have replaced it in between.
    let mut guard = shard.write();
    let still_expired = match guard.get(key) {
      Some(entry) if !entry.is_expired(ttl) => {
        Metrics::bump(&self.shared.metrics.hits);
        return Some(entry.value());
      }
      Some(_) => true,
      None => false,
    };
    if still_expired {
      guard.remove(key);
      Metrics::bump(&self.shared.metrics.expired);
    }
    Metrics::bump(&self.shared.metrics.misses);
    None
  }

  /// Stores `value` under `key`, replacing any previous entry and restarting
  /// its time-to-live.
  pub fn insert(&self, key: K, value: V) -> Arc<V> {
    let value = Arc::new(value);
    let shard = self.shared.store.get_shard(&key);
    shard.write().insert(key, CacheEntry::new(value.clone()));
    Metrics::bump(&self.shared.metrics.inserts);
    value
  }

  /// Returns the cached value for `key`, or runs `init` on a miss and caches
  /// its successful result.
  ///
  /// Errors from `init` are handed back to the caller and nothing is cached.
  pub async fn get_or_try_insert_with<F, E>(&self, key: K, init: F) -> Result<Arc<V>, E>
  where
    F: Future<Output = Result<V, E>>,
  {
    if let Some(value) = self.get(&key) {
      return Ok(value);
    }
    let value = init.await?;
    Ok(self.insert(key, value))
  }

  /// Removes the entry for `key`. Returns `true` if one was present.
  pub fn invalidate<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let removed = self.shared.store.get_shard(key).write().remove(key).is_some();
    if removed {
      Metrics::bump(&self.shared.metrics.invalidations);
    }
    removed
  }

  /// Removes every entry whose key matches `predicate`. Returns the number
  /// of entries removed.
  pub fn invalidate_where<P>(&self, mut predicate: P) -> usize
  where
    P: FnMut(&K) -> bool,
  {
    let mut removed = 0;
    for shard in self.shared.store.iter_shards() {
      let mut guard = shard.write();
      let before = guard.len();
      guard.retain(|key, _| !predicate(key));
      removed += before - guard.len();
    }
    for _ in 0..removed {
      Metrics::bump(&self.shared.metrics.invalidations);
    }
    removed
  }

  /// Empties the whole cache.
  pub fn clear(&self) {
    for shard in self.shared.store.iter_shards() {
      shard.write().clear();
    }
    Metrics::bump(&self.shared.metrics.clears);
  }

  /// Number of stored entries, including expired ones not yet read.
  pub fn len(&self) -> usize {
    self.shared.store.iter_shards().map(|shard| shard.read().len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the entry count and key list.
  ///
  /// Expiry is lazy, so entries past their TTL that nobody has read yet are
  /// still listed.
  pub fn stats(&self) -> CacheStats<K>
  where
    K: Clone,
  {
    let mut keys = Vec::new();
    for shard in self.shared.store.iter_shards() {
      keys.extend(shard.read().keys().cloned());
    }
    CacheStats {
      entries: keys.len(),
      keys,
    }
  }

  /// Age of the entry stored under `key`, if any, regardless of expiry.
  pub fn age_of<Q>(&self, key: &Q) -> Option<Duration>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.shared.store.get_shard(key).read().get(key).map(CacheEntry::age)
  }
}
