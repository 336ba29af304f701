use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("logging configuration file not found: {0}")]
  ConfigNotFound(String),

  #[error("failed to read logging configuration: {0}")]
  ConfigRead(#[from] io::Error),

  #[error("failed to parse logging configuration: {0}")]
  ConfigParse(String),

  #[error("invalid logging configuration for '{field}': {message}")]
  InvalidConfigValue { field: String, message: String },

  #[error("failed to encode log event: {0}")]
  Encode(String),

  #[error("failed to initialise logging: {0}")]
  Init(String),
}

pub type Result<T> = std::result::Result<T, Error>;
