use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Keyed leading-edge throttle.
///
/// The first call under a key runs immediately; further calls under that key
/// are dropped until `interval` has passed since the last call that ran.
/// Nothing is queued, so there is no trailing call and nothing to cancel.
#[derive(Debug, Default)]
pub struct Throttler {
  last_run: Mutex<HashMap<String, Instant>>,
}

impl Throttler {
  pub fn new() -> Self {
    Self::default()
  }

  /// Runs `f` now unless a call under `key` ran less than `interval` ago.
  ///
  /// Returns `true` if `f` ran and `false` if the call was dropped.
  pub fn throttle<F>(&self, key: &str, interval: Duration, f: F) -> bool
  where
    F: FnOnce(),
  {
    let now = Instant::now();
    {
      let mut last_run = self.last_run.lock();
      if let Some(previous) = last_run.get(key) {
        if now.saturating_duration_since(*previous) < interval {
          tracing::trace!(key, "throttled call dropped");
          return false;
        }
      }
      last_run.insert(key.to_string(), now);
    }
    // Run outside the lock so `f` may use the throttler itself.
    f();
    true
  }

  /// Forgets the cooldown for `key`, letting the next call through.
  pub fn reset(&self, key: &str) -> bool {
    self.last_run.lock().remove(key).is_some()
  }

  pub fn clear_all(&self) {
    self.last_run.lock().clear();
  }
}
