use crate::error::BatchError;
use crate::runtime::{TaskSpawner, TokioSpawner};

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::oneshot;

type BoxedCall<R> = Pin<Box<dyn Future<Output = Result<R, String>> + Send>>;
type OpFn<A, R> = dyn Fn(A) -> BoxedCall<R> + Send + Sync;

/// Flush thresholds for a [`Batcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
  /// Flush as soon as this many calls are queued.
  pub batch_size: usize,
  /// Flush this long after the first call enters an idle queue.
  pub batch_timeout: Duration,
}

impl Default for BatchConfig {
  fn default() -> Self {
    Self {
      batch_size: 10,
      batch_timeout: Duration::from_millis(50),
    }
  }
}

/// A named async operation that can be batched.
///
/// Calls are grouped by operation identity: clones of one `BatchOp` belong to
/// the same group, two separately constructed ops never do, even if they
/// share a name.
pub struct BatchOp<A, R> {
  name: Arc<str>,
  func: Arc<OpFn<A, R>>,
}

impl<A, R> Clone for BatchOp<A, R> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      func: self.func.clone(),
    }
  }
}

impl<A, R> fmt::Debug for BatchOp<A, R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BatchOp").field("name", &self.name).finish()
  }
}

impl<A, R> BatchOp<A, R> {
  pub fn new<F, Fut, E>(name: impl Into<Arc<str>>, f: F) -> Self
  where
    A: 'static,
    R: 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    E: fmt::Display + 'static,
  {
    let func = move |args: A| {
      let fut = f(args);
      Box::pin(async move { fut.await.map_err(|e| e.to_string()) }) as BoxedCall<R>
    };
    Self {
      name: name.into(),
      func: Arc::new(func),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  fn same_op(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.func, &other.func)
  }
}

struct QueuedCall<A, R> {
  op: BatchOp<A, R>,
  args: A,
  reply: oneshot::Sender<Result<R, BatchError>>,
}

struct QueueState<A, R> {
  calls: Vec<QueuedCall<A, R>>,
  // Bumped on every flush or clear so a stale flush timer can tell that the
  // batch it was armed for is already gone.
  epoch: u64,
}

struct BatcherInner<A, R> {
  config: BatchConfig,
  spawner: Arc<dyn TaskSpawner>,
  queue: Mutex<QueueState<A, R>>,
}

/// Groups homogeneous async calls into shared round-trips.
///
/// The queue is flushed when it reaches `batch_size`, or `batch_timeout` after
/// the first call entered an idle queue, whichever happens first. On flush:
/// - calls are grouped by operation identity;
/// - within a group, calls with equal arguments share one underlying call and
///   its result is broadcast to each of them;
/// - distinct calls run concurrently and each caller receives the result
///   recorded for its own index;
/// - if any call of a group fails, every caller in that group receives the
///   same error.
pub struct Batcher<A, R> {
  inner: Arc<BatcherInner<A, R>>,
}

impl<A, R> Clone for Batcher<A, R> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

impl<A, R> fmt::Debug for Batcher<A, R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Batcher")
      .field("config", &self.inner.config)
      .field("queued", &self.inner.queue.lock().calls.len())
      .finish()
  }
}

impl<A, R> Batcher<A, R>
where
  A: PartialEq + Clone + Send + 'static,
  R: Clone + Send + 'static,
{
  /// Creates a batcher on the current Tokio runtime.
  /// Panics if called outside of a Tokio runtime.
  pub fn new(config: BatchConfig) -> Self {
    Self::with_spawner(config, Arc::new(TokioSpawner::new()))
  }

  pub fn with_spawner(config: BatchConfig, spawner: Arc<dyn TaskSpawner>) -> Self {
    Self {
      inner: Arc::new(BatcherInner {
        config: BatchConfig {
          batch_size: config.batch_size.max(1),
          ..config
        },
        spawner,
        queue: Mutex::new(QueueState {
          calls: Vec::new(),
          epoch: 0,
        }),
      }),
    }
  }

  pub fn config(&self) -> BatchConfig {
    self.inner.config
  }

  /// Number of calls waiting for the next flush.
  pub fn queued(&self) -> usize {
    self.inner.queue.lock().calls.len()
  }

  /// Enqueues a call to `op` and waits for the batch it lands in.
  pub async fn call(&self, op: &BatchOp<A, R>, args: A) -> Result<R, BatchError> {
    let (reply, response) = oneshot::channel();
    let call = QueuedCall {
      op: op.clone(),
      args,
      reply,
    };

    let full_batch = {
      let mut queue = self.inner.queue.lock();
      queue.calls.push(call);
      if queue.calls.len() >= self.inner.config.batch_size {
        queue.epoch += 1;
        Some(std::mem::take(&mut queue.calls))
      } else {
        if queue.calls.len() == 1 {
          self.arm_timer(queue.epoch);
        }
        None
      }
    };

    if let Some(batch) = full_batch {
      tracing::debug!(size = batch.len(), "batch size reached, flushing");
      self.inner.spawner.spawn(Box::pin(process_batch(batch)));
    }

    response.await.unwrap_or(Err(BatchError::Dropped))
  }

  /// Flushes whatever is queued right now and waits for it to complete.
  pub async fn flush(&self) {
    let batch = {
      let mut queue = self.inner.queue.lock();
      queue.epoch += 1;
      std::mem::take(&mut queue.calls)
    };
    if !batch.is_empty() {
      process_batch(batch).await;
    }
  }

  /// Drops the queue, rejecting every pending call with
  /// [`BatchError::Cancelled`]. Returns the number of calls rejected.
  pub fn clear_all(&self) -> usize {
    let batch = {
      let mut queue = self.inner.queue.lock();
      queue.epoch += 1;
      std::mem::take(&mut queue.calls)
    };
    let cancelled = batch.len();
    for call in batch {
      let _ = call.reply.send(Err(BatchError::Cancelled));
    }
    if cancelled > 0 {
      tracing::debug!(cancelled, "batch queue cleared");
    }
    cancelled
  }

  fn arm_timer(&self, armed_epoch: u64) {
    let inner = Arc::clone(&self.inner);
    let timeout = inner.config.batch_timeout;
    self.inner.spawner.spawn(Box::pin(async move {
      tokio::time::sleep(timeout).await;
      let batch = {
        let mut queue = inner.queue.lock();
        if queue.epoch != armed_epoch || queue.calls.is_empty() {
          return;
        }
        queue.epoch += 1;
        std::mem::take(&mut queue.calls)
      };
      tracing::debug!(size = batch.len(), "batch timeout elapsed, flushing");
      process_batch(batch).await;
    }));
  }
}

async fn process_batch<A, R>(batch: Vec<QueuedCall<A, R>>)
where
  A: PartialEq + Clone + Send + 'static,
  R: Clone + Send + 'static,
{
  // Group by operation identity, keeping first-seen order.
  let mut groups: Vec<Vec<QueuedCall<A, R>>> = Vec::new();
  for call in batch {
    match groups.iter_mut().find(|group| group[0].op.same_op(&call.op)) {
      Some(group) => group.push(call),
      None => groups.push(vec![call]),
    }
  }

  join_all(groups.into_iter().map(run_group)).await;
}

async fn run_group<A, R>(calls: Vec<QueuedCall<A, R>>)
where
  A: PartialEq + Clone + Send + 'static,
  R: Clone + Send + 'static,
{
  let op = calls[0].op.clone();

  // Deduplicate identical arguments; `slots[i]` is the index of the unique
  // call whose result answers `calls[i]`.
  let mut unique: Vec<A> = Vec::new();
  let mut slots = Vec::with_capacity(calls.len());
  for call in &calls {
    match unique.iter().position(|args| *args == call.args) {
      Some(slot) => slots.push(slot),
      None => {
        unique.push(call.args.clone());
        slots.push(unique.len() - 1);
      }
    }
  }

  tracing::trace!(
    op = op.name(),
    callers = calls.len(),
    underlying = unique.len(),
    "running batch group"
  );

  let results = join_all(unique.into_iter().map(|args| (op.func)(args))).await;

  match results.into_iter().collect::<Result<Vec<R>, String>>() {
    Ok(values) => {
      for (call, slot) in calls.into_iter().zip(slots) {
        let _ = call.reply.send(Ok(values[slot].clone()));
      }
    }
    Err(message) => {
      tracing::debug!(op = op.name(), error = %message, "batch group failed");
      for call in calls {
        let _ = call.reply.send(Err(BatchError::Failed(message.clone())));
      }
    }
  }
}
