//! Configuration-driven logging for the campus services.
//!
//! A YAML file declares appenders (`console`, `file`, `rolling_file`), their
//! encoders (`pattern`, `json_lines`) and loggers keyed by target prefix with
//! a level, appender list and additivity flag. `root` catches everything
//! else. Events from the `log` crate are bridged into `tracing`.
//!
//! ```no_run
//! let dir = std::env::current_dir().unwrap();
//! let path = campus_logging::find_config_file(&dir, None).unwrap();
//! // Keep the guards alive until shutdown so buffered lines are flushed.
//! let _logging = campus_logging::init_from_file(&path).unwrap();
//! tracing::info!(target: "campus::gate", "ready");
//! ```

pub mod config;
pub mod encoders;
pub mod error;
pub mod model;
mod subscriber;

pub use config::{find_config_file, load_config_file, parse_config, LoggingConfig};
pub use error::{Error, Result};
pub use model::{LogEvent, LogValue};
pub use subscriber::build_layer;
pub use subscriber::dispatch::DispatchLayer;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;

/// Handle returned by the `init_*` functions. Dropping it flushes and stops
/// the background writers.
#[must_use = "dropping the InitResult stops the log writers"]
pub struct InitResult {
  guards: Vec<WorkerGuard>,
}

impl InitResult {
  pub fn appender_count(&self) -> usize {
    self.guards.len()
  }
}

/// Installs a global subscriber built from `config`.
pub fn init_from_config(config: &LoggingConfig) -> Result<InitResult> {
  let (layer, guards) = build_layer(config)?;
  let subscriber = tracing_subscriber::registry().with(layer);
  tracing::subscriber::set_global_default(subscriber).map_err(|e| Error::Init(e.to_string()))?;
  if let Err(e) = tracing_log::LogTracer::init() {
    tracing::debug!(error = %e, "log bridge already installed");
  }
  Ok(InitResult { guards })
}

pub fn init_from_file(path: &Path) -> Result<InitResult> {
  let config = load_config_file(path)?;
  init_from_config(&config)
}

/// `info` and above to stdout, for binaries without a logging file.
pub fn init_default() -> Result<InitResult> {
  init_from_config(&LoggingConfig::console_default())
}
