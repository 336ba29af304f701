use thiserror::Error;

/// Why a batched call did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
  /// The underlying operation failed. Every caller in the same group receives
  /// the same message.
  #[error("batched operation failed: {0}")]
  Failed(String),

  /// The queue was cleared with `clear_all()` before the call was flushed.
  #[error("batched call was cancelled before it was flushed")]
  Cancelled,

  /// The batch processing task went away without answering.
  #[error("batched call was dropped without a result")]
  Dropped,
}
