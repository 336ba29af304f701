mod common;

use campus_scheduler::Debouncer;
use common::{Counter, CountingSpawner};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

const DELAY: Duration = Duration::from_millis(300);

#[tokio::test(start_paused = true)]
async fn test_five_calls_within_delay_run_once() {
  let debouncer = Debouncer::new();
  let counter = Counter::new();

  // Five calls spread over 200ms, all inside one 300ms idle period.
  for _ in 0..5 {
    let counter = counter.clone();
    debouncer.debounce("search", DELAY, move || async move { counter.hit() });
    sleep(Duration::from_millis(50)).await;
  }

  // 250ms after the first call nothing has run yet.
  assert_eq!(counter.get(), 0);
  assert!(debouncer.is_pending("search"));

  // The last call was made at t=200ms, so it fires at t=500ms.
  sleep(Duration::from_millis(240)).await;
  assert_eq!(counter.get(), 0, "must wait for the final call's delay");

  sleep(Duration::from_millis(20)).await;
  assert_eq!(counter.get(), 1);
  assert_eq!(debouncer.pending(), 0);

  // No stragglers from the superseded calls.
  sleep(DELAY * 2).await;
  assert_eq!(counter.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_keys_are_independent() {
  let debouncer = Debouncer::new();
  let counter = Counter::new();

  for key in ["a", "b", "a", "b"] {
    let counter = counter.clone();
    debouncer.debounce(key, DELAY, move || async move { counter.hit() });
  }

  sleep(DELAY + Duration::from_millis(10)).await;
  assert_eq!(counter.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_the_pending_call() {
  let debouncer = Debouncer::new();
  let counter = Counter::new();

  let c = counter.clone();
  debouncer.debounce("resize", DELAY, move || async move { c.hit() });
  assert!(debouncer.cancel("resize"));
  assert!(!debouncer.cancel("resize"));

  sleep(DELAY * 2).await;
  assert_eq!(counter.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_cancels_every_key() {
  let debouncer = Debouncer::new();
  let counter = Counter::new();

  for key in ["a", "b", "c"] {
    let c = counter.clone();
    debouncer.debounce(key, DELAY, move || async move { c.hit() });
  }
  assert_eq!(debouncer.pending(), 3);

  debouncer.clear_all();
  sleep(DELAY * 2).await;
  assert_eq!(counter.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_separate_idle_periods_each_fire() {
  let debouncer = Debouncer::new();
  let counter = Counter::new();

  for _ in 0..2 {
    let c = counter.clone();
    debouncer.debounce("save", DELAY, move || async move { c.hit() });
    sleep(DELAY + Duration::from_millis(10)).await;
  }
  assert_eq!(counter.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_timers_stop_immediately() {
  let spawner = CountingSpawner::new();
  let debouncer = Debouncer::with_spawner(Arc::new(spawner.clone()));
  let counter = Counter::new();

  for _ in 0..5 {
    let counter = counter.clone();
    debouncer.debounce("search", DELAY, move || async move { counter.hit() });
  }
  sleep(Duration::from_millis(1)).await;
  assert_eq!(spawner.running(), 1, "only the latest timer stays asleep");

  debouncer.cancel("search");
  sleep(Duration::from_millis(1)).await;
  assert_eq!(spawner.running(), 0);

  sleep(DELAY).await;
  assert_eq!(counter.get(), 0);
}
