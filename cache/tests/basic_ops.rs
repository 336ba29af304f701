mod common;

use std::sync::Arc;

use campus_cache::CacheStats;
use common::{build_test_cache, key, FIVE_MINUTES};

#[test]
fn test_insert_and_get() {
  let cache = build_test_cache(FIVE_MINUTES);
  cache.insert(key("key1"), vec![10]);

  // Test get hit
  assert_eq!(cache.get("key1"), Some(Arc::new(vec![10])));

  // Test get miss
  assert!(cache.get("non-existent").is_none());

  let metrics = cache.metrics();
  assert_eq!(metrics.inserts, 1);
  assert_eq!(metrics.hits, 1);
  assert_eq!(metrics.misses, 1);
  assert!((metrics.hit_ratio - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_invalidate_and_clear() {
  let cache = build_test_cache(FIVE_MINUTES);
  cache.insert(key("key1"), vec![10]);
  cache.insert(key("key2"), vec![20]);

  assert!(cache.invalidate("key1"));
  assert!(
    !cache.invalidate("key1"),
    "Double invalidate should fail"
  );
  assert!(cache.get("key1").is_none());
  assert_eq!(cache.metrics().invalidations, 1);
  assert_eq!(cache.len(), 1);

  cache.clear();
  assert!(cache.get("key2").is_none());
  assert!(cache.is_empty());
  assert_eq!(cache.metrics().clears, 1);
}

#[test]
fn test_invalidate_where_removes_matching_prefix() {
  let cache = build_test_cache(FIVE_MINUTES);
  cache.insert(key("photos|a"), vec![1]);
  cache.insert(key("photos|b"), vec![2]);
  cache.insert(key("posts|a"), vec![3]);

  let removed = cache.invalidate_where(|k| k.starts_with("photos|"));

  assert_eq!(removed, 2);
  assert!(cache.get("posts|a").is_some());
  assert_eq!(cache.metrics().invalidations, 2);
}

#[test]
fn test_stats_reports_count_and_keys() {
  let cache = build_test_cache(FIVE_MINUTES);
  cache.insert(key("a"), vec![]);
  cache.insert(key("b"), vec![]);
  cache.insert(key("a"), vec![1]);

  let CacheStats { entries, mut keys } = cache.stats();
  keys.sort();
  assert_eq!(entries, 2);
  assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_clones_share_storage() {
  let cache = build_test_cache(FIVE_MINUTES);
  let other = cache.clone();
  other.insert(key("shared"), vec![5]);
  assert_eq!(cache.get("shared").as_deref(), Some(&vec![5]));
}

#[test]
fn test_stats_serializes() {
  let cache = build_test_cache(FIVE_MINUTES);
  cache.insert(key("only"), vec![]);
  let json = serde_json::to_value(cache.stats()).unwrap();
  assert_eq!(json, serde_json::json!({ "entries": 1, "keys": ["only"] }));
}
