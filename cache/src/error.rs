use std::fmt;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The cache was configured with a zero time-to-live, which would make
  /// every entry expire on insert.
  ZeroTimeToLive,
  /// The cache was configured with zero shards, which is not allowed.
  ZeroShards,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroTimeToLive => write!(f, "cache time-to-live cannot be zero"),
      BuildError::ZeroShards => write!(f, "shard count cannot be zero"),
    }
  }
}

impl std::error::Error for BuildError {}
