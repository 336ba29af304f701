use campus_cache::{BuildError, CacheBuilder, DEFAULT_TIME_TO_LIVE};
use std::time::Duration;

#[test]
fn test_default_ttl_is_five_minutes() {
  let cache = CacheBuilder::<String, u32>::new().build().unwrap();
  assert_eq!(cache.time_to_live(), DEFAULT_TIME_TO_LIVE);
  assert_eq!(DEFAULT_TIME_TO_LIVE, Duration::from_millis(300_000));
}

#[test]
fn test_zero_ttl_is_rejected() {
  let result = CacheBuilder::<String, u32>::new()
    .time_to_live(Duration::ZERO)
    .build();
  assert_eq!(result.unwrap_err(), BuildError::ZeroTimeToLive);
}

#[test]
fn test_zero_shards_is_rejected() {
  let result = CacheBuilder::<String, u32>::new().shards(0).build();
  assert_eq!(result.unwrap_err(), BuildError::ZeroShards);
}

#[test]
fn test_odd_shard_count_still_routes_keys() {
  // 3 is rounded up to 4 shards.
  let cache = CacheBuilder::<u32, u32>::new().shards(3).build().unwrap();
  for i in 0..64 {
    cache.insert(i, i * 2);
  }
  for i in 0..64 {
    assert_eq!(cache.get(&i).as_deref(), Some(&(i * 2)));
  }
  assert_eq!(cache.stats().entries, 64);
}
