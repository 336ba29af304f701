use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures reported by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
  #[error("document '{collection}/{id}' does not exist")]
  NotFound { collection: String, id: String },

  #[error("store call timed out after {0:?}")]
  Timeout(Duration),

  #[error("store rejected the request: {0}")]
  Rejected(String),

  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("batch of {size} writes exceeds the limit of {limit}")]
  BatchTooLarge { size: usize, limit: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("configuration file not found: {0}")]
  ConfigNotFound(String),

  #[error("failed to read configuration file: {0}")]
  ConfigRead(#[from] io::Error),

  #[error("failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("invalid value for '{field}': {message}")]
  InvalidConfigValue { field: String, message: String },
}

/// Errors raised while assembling a [`Campus`](crate::Campus).
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("failed to build the query cache: {0}")]
  Cache(#[from] campus_cache::BuildError),
}
