#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A shared call counter handed to scheduled closures.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn hit(&self) {
    self.0.fetch_add(1, Ordering::SeqCst);
  }

  pub fn get(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}

/// Spawns onto Tokio and tracks how many spawned tasks are still running.
#[derive(Clone, Default)]
pub struct CountingSpawner {
  alive: Counter,
  finished: Counter,
}

struct FinishGuard(Counter);

impl Drop for FinishGuard {
  fn drop(&mut self) {
    self.0.hit();
  }
}

impl CountingSpawner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn running(&self) -> usize {
    self.alive.get() - self.finished.get()
  }
}

impl campus_scheduler::TaskSpawner for CountingSpawner {
  fn spawn(&self, future: std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>) {
    self.alive.hit();
    let guard = FinishGuard(self.finished.clone());
    tokio::spawn(async move {
      let _guard = guard;
      future.await;
    });
  }
}
