use crate::runtime::{TaskSpawner, TokioSpawner};

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// The call allowed to fire under a key. Dropping it wakes and ends the
/// sleeping timer task.
struct PendingCall {
  generation: u64,
  _cancel: oneshot::Sender<()>,
}

/// Keyed trailing-edge debounce.
///
/// Each `debounce` call supersedes the pending call registered under the same
/// key, so at most one call per key runs per idle period: the last one,
/// `delay` after it was made. A superseded or cancelled call's timer task ends
/// right away instead of sleeping out its delay.
pub struct Debouncer {
  spawner: Arc<dyn TaskSpawner>,
  pending: Arc<Mutex<HashMap<String, PendingCall>>>,
  next_generation: AtomicU64,
}

impl fmt::Debug for Debouncer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Debouncer")
      .field("pending", &self.pending.lock().len())
      .finish_non_exhaustive()
  }
}

impl Debouncer {
  /// Creates a debouncer on the current Tokio runtime.
  /// Panics if called outside of a Tokio runtime.
  pub fn new() -> Self {
    Self::with_spawner(Arc::new(TokioSpawner::new()))
  }

  pub fn with_spawner(spawner: Arc<dyn TaskSpawner>) -> Self {
    Self {
      spawner,
      pending: Arc::new(Mutex::new(HashMap::new())),
      next_generation: AtomicU64::new(1),
    }
  }

  /// Schedules `f` to run `delay` from now under `key`, cancelling any call
  /// still pending under that key.
  pub fn debounce<F, Fut>(&self, key: &str, delay: Duration, f: F)
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
    let (cancel, cancelled) = oneshot::channel::<()>();
    let call = PendingCall {
      generation,
      _cancel: cancel,
    };
    if self.pending.lock().insert(key.to_string(), call).is_some() {
      tracing::trace!(key, "debounced call superseded");
    }

    let pending = Arc::clone(&self.pending);
    let key = key.to_string();
    self.spawner.spawn(Box::pin(async move {
      tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        // The sender only goes away when the call is superseded or cancelled.
        _ = cancelled => return,
      }

      let should_fire = {
        let mut pending = pending.lock();
        if pending.get(&key).is_some_and(|call| call.generation == generation) {
          pending.remove(&key);
          true
        } else {
          false
        }
      };

      if should_fire {
        f().await;
      }
    }));
  }

  /// Cancels the pending call under `key`. Returns `true` if one was pending.
  pub fn cancel(&self, key: &str) -> bool {
    self.pending.lock().remove(key).is_some()
  }

  pub fn is_pending(&self, key: &str) -> bool {
    self.pending.lock().contains_key(key)
  }

  /// Number of keys with a call waiting to fire.
  pub fn pending(&self) -> usize {
    self.pending.lock().len()
  }

  /// Cancels every pending call.
  pub fn clear_all(&self) {
    self.pending.lock().clear();
  }
}

impl Default for Debouncer {
  fn default() -> Self {
    Self::new()
  }
}
