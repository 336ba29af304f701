//! YAML configuration: a raw serde layer mirroring the file, processed into
//! validated [`Config`] values with durations written in humantime form
//! (`"5m"`, `"30s"`).

pub mod processed;
pub mod raw;

pub use processed::{
  process_raw_config, AuditConfig, BatchWriteConfig, CacheConfig, CollectionsConfig, Config,
  GateConfig, RateLimit, SchedulerConfig, StoreConfig,
};

use crate::error::ConfigError;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, ConfigError>;

const CONFIG_STEM: &str = "campus";

/// Looks for `campus.<env>.yaml`, then `campus.yaml`, in `dir`.
///
/// The environment name comes from `env_suffix`, falling back to `CAMPUS_ENV`
/// and then `APP_ENV`.
pub fn find_config_file(dir: &Path, env_suffix: Option<&str>) -> Result<PathBuf> {
  let env_name = env_suffix
    .map(str::to_string)
    .or_else(|| env::var("CAMPUS_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok());

  let mut candidates = Vec::with_capacity(2);
  if let Some(name) = env_name.filter(|n| !n.is_empty()) {
    candidates.push(dir.join(format!("{CONFIG_STEM}.{name}.yaml")));
  }
  candidates.push(dir.join(format!("{CONFIG_STEM}.yaml")));

  candidates
    .iter()
    .find(|path| path.is_file())
    .cloned()
    .ok_or_else(|| {
      let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
      ConfigError::ConfigNotFound(tried.join(", "))
    })
}

pub fn from_yaml_str(contents: &str) -> Result<Config> {
  let raw: raw::ConfigRaw = if contents.trim().is_empty() {
    raw::ConfigRaw::default()
  } else {
    serde_yaml::from_str(contents).map_err(|e| ConfigError::ConfigParse(e.to_string()))?
  };
  process_raw_config(raw)
}

pub fn load_from_file(path: &Path) -> Result<Config> {
  let contents = fs::read_to_string(path)?;
  let config = from_yaml_str(&contents)?;
  tracing::debug!(path = %path.display(), "loaded campus configuration");
  Ok(config)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use std::time::Duration;

  #[test]
  fn empty_document_yields_defaults() {
    assert_eq!(from_yaml_str("").unwrap(), Config::default());
  }

  #[test]
  fn durations_use_humantime() {
    let config = from_yaml_str(
      "gate:\n  cache_timeout: 2m\n  admin_actions:\n    max_events: 3\n    window: 30s\nstore:\n  timeout: 1500ms\n",
    )
    .unwrap();
    assert_eq!(config.gate.cache_timeout, Duration::from_secs(120));
    assert_eq!(config.gate.admin_actions, RateLimit::new(3, Duration::from_secs(30)));
    assert_eq!(config.store.timeout, Duration::from_millis(1500));
    assert_eq!(config.gate.session_timeout, Duration::from_secs(30 * 60));
  }

  #[test]
  fn rejects_unknown_fields() {
    let err = from_yaml_str("gate:\n  max_attempts: 3\n").unwrap_err();
    assert!(matches!(err, ConfigError::ConfigParse(_)));
  }

  #[test]
  fn rejects_zero_and_malformed_values() {
    let err = from_yaml_str("batch:\n  max_writes: 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidConfigValue { ref field, .. } if field == "batch.max_writes"));

    let err = from_yaml_str("cache:\n  time_to_live: soon\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidConfigValue { ref field, .. } if field == "cache.time_to_live"));
  }
}
