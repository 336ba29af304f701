use super::AdminGate;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use campus_scheduler::TaskSpawner;

/// Background task that periodically sweeps an [`AdminGate`].
///
/// The task exits on the tick after the `Janitor` is dropped, or once the
/// gate itself is gone.
#[derive(Debug)]
pub struct Janitor {
  stop_flag: Arc<AtomicBool>,
}

impl Janitor {
  pub(crate) fn spawn(gate: Weak<AdminGate>, interval: Duration, spawner: &dyn TaskSpawner) -> Self {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop = Arc::clone(&stop_flag);

    spawner.spawn(Box::pin(async move {
      loop {
        tokio::time::sleep(interval).await;
        if stop.load(Ordering::Relaxed) {
          break;
        }
        let Some(gate) = gate.upgrade() else {
          break;
        };
        let removed = gate.sweep();
        if removed > 0 {
          tracing::debug!(removed, "gate janitor swept expired state");
        }
      }
    }));

    Self { stop_flag }
  }

  pub fn stop(&self) {
    self.stop_flag.store(true, Ordering::Relaxed);
  }
}

impl Drop for Janitor {
  fn drop(&mut self) {
    self.stop();
  }
}
