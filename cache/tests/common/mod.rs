use std::time::Duration;

use campus_cache::{CacheBuilder, QueryCache};

/// Default query cache TTL expressed in milliseconds: 300 000 ms.
pub const FIVE_MINUTES: Duration = Duration::from_millis(300_000);

// Helper to build a small single-shard cache for testing purposes.
pub fn build_test_cache(ttl: Duration) -> QueryCache<String, Vec<u32>> {
  CacheBuilder::new()
    .shards(1)
    .time_to_live(ttl)
    .build()
    .unwrap()
}

pub fn key(s: &str) -> String {
  s.to_string()
}
