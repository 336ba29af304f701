mod common;

use common::*;

use campus::store::{FilterOp, Query};
use campus::{CachedQueries, StoreError};

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::advance;

fn queries(store: Arc<ScriptedStore>) -> CachedQueries {
  CachedQueries::with_ttl(store, Duration::from_secs(300), Some(1)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn repeated_query_is_served_from_cache_until_expiry() {
  let store = seeded_store();
  let queries = queries(store.clone());
  let query = Query::collection("photos").filter("status", FilterOp::Eq, json!("pending"));

  let first = queries.fetch(&query).await;
  assert!(first.success && !first.from_cache);
  assert_eq!(first.documents.len(), 3);

  advance(Duration::from_millis(299_999)).await;
  let second = queries.fetch(&query).await;
  assert!(second.from_cache);
  assert!(Arc::ptr_eq(&first.documents, &second.documents));
  assert_eq!(store.calls("query"), 1);

  advance(Duration::from_millis(1)).await;
  let third = queries.fetch(&query).await;
  assert!(!third.from_cache);
  assert_eq!(store.calls("query"), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_reads_are_not_cached() {
  let store = seeded_store();
  let queries = queries(store.clone());
  let query = Query::collection("photos").limit(2);

  store.fail("query", StoreError::Unavailable("offline".into()));
  let failed = queries.fetch(&query).await;
  assert!(!failed.success);
  assert!(failed.documents.is_empty());
  assert_eq!(failed.error.as_deref(), Some("store unavailable: offline"));
  assert_eq!(queries.stats().entries, 0);

  store.recover();
  let ok = queries.fetch(&query).await;
  assert!(ok.success && !ok.from_cache);
  assert_eq!(ok.documents.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn invalidation_is_scoped_to_a_collection() {
  let store = seeded_store();
  let queries = queries(store.clone());
  let photos = Query::collection("photos");
  let second_page = Query::collection("photos").start_after("p1");
  let users = Query::collection("users");

  queries.fetch(&photos).await;
  queries.fetch(&second_page).await;
  queries.fetch(&users).await;
  assert_eq!(queries.stats().entries, 3);

  assert_eq!(queries.invalidate_collection("photos"), 2);
  assert!(queries.fetch(&users).await.from_cache);
  assert!(!queries.fetch(&photos).await.from_cache);

  queries.clear();
  assert_eq!(queries.stats().entries, 0);
  assert_eq!(queries.metrics().clears, 1);
}

#[tokio::test(start_paused = true)]
async fn cursor_with_separators_gets_its_own_entry() {
  let store = seeded_store();
  store.inner.insert("photos", "p1|limit=3", json!({"status": "pending"}));
  let queries = queries(store.clone());
  let limited = Query::collection("photos").start_after("p1").limit(3);
  let odd_cursor = Query::collection("photos").start_after("p1|limit=3");

  let first = queries.fetch(&limited).await;
  assert!(first.success && !first.from_cache);

  let second = queries.fetch(&odd_cursor).await;
  assert!(second.success && !second.from_cache);
  assert_eq!(store.calls("query"), 2);
  assert_eq!(queries.stats().entries, 2);
  assert!(second.documents.iter().all(|doc| doc.id != "p1|limit=3"));
}
