mod common;

use campus_scheduler::{RequestScheduler, Throttler};
use common::Counter;
use tokio::time::{sleep, Duration};

const INTERVAL: Duration = Duration::from_millis(100);

#[tokio::test(start_paused = true)]
async fn test_three_calls_within_interval_run_once() {
  let throttler = Throttler::new();
  let counter = Counter::new();

  assert!(throttler.throttle("scroll", INTERVAL, || counter.hit()));
  sleep(Duration::from_millis(30)).await;
  assert!(!throttler.throttle("scroll", INTERVAL, || counter.hit()));
  sleep(Duration::from_millis(30)).await;
  assert!(!throttler.throttle("scroll", INTERVAL, || counter.hit()));

  assert_eq!(counter.get(), 1);

  // Dropped calls are not deferred: nothing runs later on its own.
  sleep(INTERVAL * 3).await;
  assert_eq!(counter.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_call_after_cooldown_runs() {
  let throttler = Throttler::new();
  let counter = Counter::new();

  assert!(throttler.throttle("scroll", INTERVAL, || counter.hit()));
  sleep(INTERVAL).await;
  assert!(throttler.throttle("scroll", INTERVAL, || counter.hit()));
  assert_eq!(counter.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_and_independent_keys() {
  let throttler = Throttler::new();
  let counter = Counter::new();

  assert!(throttler.throttle("a", INTERVAL, || counter.hit()));
  assert!(throttler.throttle("b", INTERVAL, || counter.hit()));
  assert!(!throttler.throttle("a", INTERVAL, || counter.hit()));

  assert!(throttler.reset("a"));
  assert!(throttler.throttle("a", INTERVAL, || counter.hit()));
  assert_eq!(counter.get(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_clear_all_resets_both_utilities() {
  let scheduler = RequestScheduler::new();
  let counter = Counter::new();

  assert!(scheduler.throttler().throttle("k", INTERVAL, || counter.hit()));
  let c = counter.clone();
  scheduler
    .debouncer()
    .debounce("k", INTERVAL, move || async move { c.hit() });

  scheduler.clear_all();

  assert!(scheduler.throttler().throttle("k", INTERVAL, || counter.hit()));
  sleep(INTERVAL * 2).await;
  assert_eq!(counter.get(), 2, "debounced call was cancelled, throttle reset");
}
