//! Request scheduling utilities for bursts of client-triggered calls.
//!
//! - [`Debouncer`]: keyed trailing-edge debounce (search-as-you-type).
//! - [`Throttler`]: keyed leading-edge throttle (scroll, resize). Calls during
//!   the cooldown are dropped, never deferred.
//! - [`Batcher`]: groups homogeneous async calls into shared round-trips,
//!   deduplicating identical arguments and broadcasting the result.
//!
//! Timers run on a [`TaskSpawner`], Tokio by default.

pub mod batch;
pub mod debounce;
pub mod error;
pub mod runtime;
pub mod throttle;

pub use batch::{BatchConfig, BatchOp, Batcher};
pub use debounce::Debouncer;
pub use error::BatchError;
pub use runtime::{TaskSpawner, TokioSpawner};
pub use throttle::Throttler;

use std::sync::Arc;

/// Bundles the keyed debounce and throttle utilities behind one handle.
#[derive(Debug)]
pub struct RequestScheduler {
  debouncer: Debouncer,
  throttler: Throttler,
}

impl RequestScheduler {
  /// Creates a scheduler on the current Tokio runtime.
  /// Panics if called outside of a Tokio runtime.
  pub fn new() -> Self {
    Self::with_spawner(Arc::new(TokioSpawner::new()))
  }

  pub fn with_spawner(spawner: Arc<dyn TaskSpawner>) -> Self {
    Self {
      debouncer: Debouncer::with_spawner(spawner),
      throttler: Throttler::new(),
    }
  }

  pub fn debouncer(&self) -> &Debouncer {
    &self.debouncer
  }

  pub fn throttler(&self) -> &Throttler {
    &self.throttler
  }

  /// Cancels every pending debounced call and forgets all throttle cooldowns.
  pub fn clear_all(&self) {
    self.debouncer.clear_all();
    self.throttler.clear_all();
  }
}

impl Default for RequestScheduler {
  fn default() -> Self {
    Self::new()
  }
}
