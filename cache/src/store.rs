use crate::entry::CacheEntry;

use core::fmt;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use crossbeam_utils::CachePadded;
use parking_lot::RwLock;

pub(crate) type ShardMap<K, V, H> = HashMap<K, CacheEntry<V>, H>;

/// A cache store that is partitioned into multiple, independently locked shards.
///
/// Operations on different keys are unlikely to contend for the same lock.
pub(crate) struct ShardedStore<K, V, H> {
  shards: Box<[CachePadded<RwLock<ShardMap<K, V, H>>>]>,
  hasher: H,
}

impl<K, V, H> fmt::Debug for ShardedStore<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ShardedStore")
      .field("num_shards", &self.shards.len())
      .finish()
  }
}

impl<K, V, H> ShardedStore<K, V, H>
where
  K: Eq + Hash,
  H: BuildHasher + Clone,
{
  /// Creates a new `ShardedStore`. `num_shards` must be a non-zero power of two.
  pub(crate) fn new(num_shards: usize, hasher: H) -> Self {
    let mut shards = Vec::with_capacity(num_shards);
    for _ in 0..num_shards {
      let shard_map = HashMap::with_hasher(hasher.clone());
      shards.push(CachePadded::new(RwLock::new(shard_map)));
    }

    Self {
      shards: shards.into_boxed_slice(),
      hasher,
    }
  }

  /// Returns the lock guarding the shard that owns `key`.
  #[inline]
  pub(crate) fn get_shard<Q>(&self, key: &Q) -> &RwLock<ShardMap<K, V, H>>
  where
    K: Borrow<Q>,
    Q: Hash + ?Sized,
  {
    let hash = self.hasher.hash_one(key);
    // Shard count is a power of two, validated by the builder.
    let index = hash as usize & (self.shards.len() - 1);
    &self.shards[index]
  }

  /// Returns an iterator over all the shard locks, for "stop-the-world"
  /// operations like `clear()` or `stats()`.
  pub(crate) fn iter_shards(&self) -> impl Iterator<Item = &RwLock<ShardMap<K, V, H>>> {
    self.shards.iter().map(|padded_lock| &**padded_lock)
  }
}
