use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct AttemptRun {
  count: u32,
  started_at: Instant,
}

/// Failed validation attempts per user.
///
/// A run starts at its first failure and is forgotten `window` later, or as
/// soon as the user validates successfully.
#[derive(Debug)]
pub struct FailedAttempts {
  window: Duration,
  runs: DashMap<String, AttemptRun>,
}

impl FailedAttempts {
  pub fn new(window: Duration) -> Self {
    Self {
      window,
      runs: DashMap::new(),
    }
  }

  fn expired(&self, run: &AttemptRun, now: Instant) -> bool {
    now.saturating_duration_since(run.started_at) >= self.window
  }

  /// Records one failure and returns the count in the current run.
  pub fn record_failure(&self, user_id: &str) -> u32 {
    let now = Instant::now();
    let mut run = self.runs.entry(user_id.to_string()).or_insert(AttemptRun {
      count: 0,
      started_at: now,
    });
    if self.expired(&run, now) {
      *run = AttemptRun {
        count: 0,
        started_at: now,
      };
    }
    run.count += 1;
    run.count
  }

  pub fn count(&self, user_id: &str) -> u32 {
    let now = Instant::now();
    let Some(run) = self.runs.get(user_id).map(|r| *r) else {
      return 0;
    };
    if self.expired(&run, now) {
      self.runs.remove_if(user_id, |_, r| self.expired(r, now));
      return 0;
    }
    run.count
  }

  pub fn reset(&self, user_id: &str) -> bool {
    self.runs.remove(user_id).is_some()
  }

  pub fn clear(&self) {
    self.runs.clear();
  }

  /// Drops expired runs and returns how many were dropped.
  pub fn sweep(&self) -> usize {
    let now = Instant::now();
    let before = self.runs.len();
    self.runs.retain(|_, run| !self.expired(run, now));
    before.saturating_sub(self.runs.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn run_is_anchored_at_first_failure() {
    let attempts = FailedAttempts::new(Duration::from_secs(15 * 60));
    attempts.record_failure("u1");
    tokio::time::advance(Duration::from_secs(10 * 60)).await;
    assert_eq!(attempts.record_failure("u1"), 2);

    // Fifteen minutes after the first failure the run is gone, even though
    // the second failure was only five minutes ago.
    tokio::time::advance(Duration::from_secs(5 * 60)).await;
    assert_eq!(attempts.count("u1"), 0);
    assert_eq!(attempts.record_failure("u1"), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn sweep_and_reset() {
    let attempts = FailedAttempts::new(Duration::from_secs(60));
    attempts.record_failure("a");
    attempts.record_failure("b");
    assert!(attempts.reset("b"));
    tokio::time::advance(Duration::from_secs(60)).await;
    assert_eq!(attempts.sweep(), 1);
    assert_eq!(attempts.count("a"), 0);
  }
}
