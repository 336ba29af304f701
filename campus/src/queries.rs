//! Reads served through the fingerprinted query cache.

use crate::store::{Document, DocumentStore, Fingerprint, Query};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use campus_cache::{CacheBuilder, CacheStats, MetricsSnapshot, QueryCache};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
  pub success: bool,
  pub documents: Arc<Vec<Document>>,
  pub from_cache: bool,
  pub error: Option<String>,
}

/// Store reads cached by query fingerprint.
///
/// Failed reads are never cached; the next fetch goes back to the store.
#[derive(Clone)]
pub struct CachedQueries {
  store: Arc<dyn DocumentStore>,
  cache: QueryCache<Fingerprint, Vec<Document>>,
}

impl fmt::Debug for CachedQueries {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CachedQueries")
      .field("cache", &self.cache)
      .finish_non_exhaustive()
  }
}

impl CachedQueries {
  pub fn new(store: Arc<dyn DocumentStore>, cache: QueryCache<Fingerprint, Vec<Document>>) -> Self {
    Self { store, cache }
  }

  /// Builds the cache with `time_to_live` and an optional shard count.
  pub fn with_ttl(
    store: Arc<dyn DocumentStore>,
    time_to_live: Duration,
    shards: Option<usize>,
  ) -> Result<Self, campus_cache::BuildError> {
    let mut builder = CacheBuilder::default().time_to_live(time_to_live);
    if let Some(shards) = shards {
      builder = builder.shards(shards);
    }
    Ok(Self::new(store, builder.build()?))
  }

  pub async fn fetch(&self, query: &Query) -> QueryOutcome {
    let key = query.fingerprint();
    if let Some(documents) = self.cache.get(&key) {
      tracing::debug!(fingerprint = %key, "query cache hit");
      return QueryOutcome {
        success: true,
        documents,
        from_cache: true,
        error: None,
      };
    }

    tracing::debug!(fingerprint = %key, "query cache miss");
    match self.store.query(query).await {
      Ok(documents) => QueryOutcome {
        success: true,
        documents: self.cache.insert(key, documents),
        from_cache: false,
        error: None,
      },
      Err(error) => {
        tracing::warn!(fingerprint = %key, error = %error, "query failed");
        QueryOutcome {
          success: false,
          documents: Arc::new(Vec::new()),
          from_cache: false,
          error: Some(error.to_string()),
        }
      }
    }
  }

  /// Drops every cached result read from `collection`.
  pub fn invalidate_collection(&self, collection: &str) -> usize {
    let removed = self.cache.invalidate_where(|key| key.collection() == collection);
    if removed > 0 {
      tracing::debug!(collection, removed, "cached queries invalidated");
    }
    removed
  }

  pub fn invalidate(&self, query: &Query) -> bool {
    self.cache.invalidate(&query.fingerprint())
  }

  pub fn clear(&self) {
    self.cache.clear();
  }

  pub fn stats(&self) -> CacheStats<Fingerprint> {
    self.cache.stats()
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.cache.metrics()
  }
}
