mod common;

use common::*;

use campus::store::{Direction, FilterOp, Query};
use campus::{Config, ReviewStatus, StatusUpdate, StoreError};

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

fn pending_photos() -> Query {
  Query::collection("photos")
    .filter("status", FilterOp::Eq, json!("pending"))
    .order_by("likes", Direction::Desc)
}

#[tokio::test(start_paused = true)]
async fn review_applies_updates_and_refreshes_cached_reads() {
  let h = harness(Some(ADMIN));

  let before = h.campus.queries().fetch(&pending_photos()).await;
  assert_eq!(before.documents.len(), 3);

  let outcome = h
    .campus
    .moderation()
    .review(
      ADMIN,
      &[
        StatusUpdate::new("p1", ReviewStatus::Approved).highlighted(true),
        StatusUpdate::new("p2", ReviewStatus::Rejected).rejection_reason("off topic"),
      ],
    )
    .await;
  assert!(outcome.success);
  assert_eq!(outcome.applied, 2);
  assert_eq!(outcome.error, None);

  let p1 = h.store.inner.document("photos", "p1").unwrap();
  assert_eq!(p1.get_str("status"), Some("approved"));
  assert_eq!(p1.get_str("reviewedBy"), Some(ADMIN));
  assert_eq!(p1.get("highlighted"), Some(&json!(true)));
  assert!(p1.get_str("reviewedAt").is_some());
  assert_eq!(p1.get("rejectionReason"), None);

  let p2 = h.store.inner.document("photos", "p2").unwrap();
  assert_eq!(p2.get_str("rejectionReason"), Some("off topic"));
  assert_eq!(p2.get("highlighted"), None);

  let after = h.campus.queries().fetch(&pending_photos()).await;
  assert!(!after.from_cache);
  let ids: Vec<_> = after.documents.iter().map(|d| d.id.as_str()).collect();
  assert_eq!(ids, ["p3"]);
}

#[tokio::test(start_paused = true)]
async fn refused_review_never_reaches_the_store() {
  let h = harness(Some(STUDENT));

  let outcome = h
    .campus
    .moderation()
    .review(STUDENT, &[StatusUpdate::new("p1", ReviewStatus::Approved)])
    .await;
  assert!(!outcome.success);
  assert_eq!(outcome.applied, 0);
  assert_eq!(outcome.error.as_deref(), Some("Insufficient privileges"));
  assert_eq!(h.store.calls("commit"), 0);
  assert_eq!(
    h.store.inner.document("photos", "p1").unwrap().get_str("status"),
    Some("pending")
  );
}

#[tokio::test(start_paused = true)]
async fn one_bad_target_fails_the_whole_batch() {
  let h = harness(Some(ADMIN));

  let outcome = h
    .campus
    .moderation()
    .review(
      ADMIN,
      &[
        StatusUpdate::new("p1", ReviewStatus::Approved),
        StatusUpdate::new("missing", ReviewStatus::Approved),
        StatusUpdate::new("p3", ReviewStatus::Approved),
      ],
    )
    .await;
  assert!(!outcome.success);
  assert_eq!(outcome.applied, 0);
  assert!(outcome.error.unwrap().contains("missing"));
  for id in ["p1", "p3"] {
    assert_eq!(
      h.store.inner.document("photos", id).unwrap().get_str("status"),
      Some("pending")
    );
  }
}

#[tokio::test(start_paused = true)]
async fn failed_commit_is_reported_and_audited() {
  let h = harness(Some(ADMIN));
  h.store.fail("commit", StoreError::Unavailable("quota exceeded".into()));

  let outcome = h
    .campus
    .moderation()
    .review(ADMIN, &[StatusUpdate::new("p1", ReviewStatus::Approved)])
    .await;
  assert!(!outcome.success);
  assert_eq!(outcome.applied, 0);
  assert_eq!(
    outcome.error.as_deref(),
    Some("store unavailable: quota exceeded")
  );

  settle().await;
  let batch_entry = h
    .store
    .inner
    .documents("admin_logs")
    .into_iter()
    .find(|e| e.get_str("action") == Some("batch_update_photos"))
    .unwrap();
  assert_eq!(batch_entry.get_str("status"), Some("failure"));
  assert_eq!(batch_entry.get("details").unwrap()["applied"], json!(0));
}

#[tokio::test(start_paused = true)]
async fn empty_review_succeeds_without_a_commit() {
  let h = harness(Some(ADMIN));

  let outcome = h.campus.moderation().review(ADMIN, &[]).await;
  assert!(outcome.success);
  assert_eq!(outcome.applied, 0);
  assert_eq!(h.store.calls("commit"), 0);
}

#[tokio::test(start_paused = true)]
async fn oversized_batch_is_refused_whole() {
  let mut config = Config::default();
  config.batch.max_writes = 2;
  let h = harness_with(config, Some(ADMIN));

  let updates: Vec<_> = ["p1", "p2", "p3"]
    .into_iter()
    .map(|id| StatusUpdate::new(id, ReviewStatus::Approved))
    .collect();
  let outcome = h.campus.moderation().review(ADMIN, &updates).await;
  assert!(!outcome.success);
  assert_eq!(
    outcome.error.as_deref(),
    Some("batch of 3 writes exceeds the limit of 2")
  );
  assert_eq!(h.store.calls("commit"), 0);
}

#[tokio::test(start_paused = true)]
async fn reviews_share_the_admin_rate_window() {
  let h = harness(Some(ADMIN));
  let update = [StatusUpdate::new("p1", ReviewStatus::Approved)];

  for _ in 0..10 {
    assert!(h.campus.moderation().review(ADMIN, &update).await.success);
  }
  tokio::time::advance(Duration::from_secs(15)).await;

  let outcome = h.campus.moderation().review(ADMIN, &update).await;
  assert!(!outcome.success);
  assert_eq!(outcome.error.as_deref(), Some("Rate limit exceeded"));
  assert_eq!(outcome.retry_after, Some(Duration::from_secs(45)));
  assert_eq!(h.store.calls("commit"), 10);
}
