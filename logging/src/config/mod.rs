pub mod processed;
pub mod raw;

use crate::error::{Error, Result};

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use processed::{process_raw_config, LoggingConfig};

const CONFIG_STEM: &str = "campus_logging";

/// Finds `campus_logging.<env>.yaml` or `campus_logging.yaml` in `base_dir`.
///
/// Without an explicit `env_suffix` the environment name is read from
/// `CAMPUS_ENV`, then `APP_ENV`.
pub fn find_config_file(base_dir: &Path, env_suffix: Option<&str>) -> Result<PathBuf> {
  let env_name = env_suffix
    .map(str::to_string)
    .or_else(|| env::var("CAMPUS_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok())
    .filter(|name| !name.is_empty());

  let mut candidates = Vec::with_capacity(2);
  if let Some(name) = env_name {
    candidates.push(base_dir.join(format!("{CONFIG_STEM}.{name}.yaml")));
  }
  candidates.push(base_dir.join(format!("{CONFIG_STEM}.yaml")));

  for candidate in &candidates {
    if candidate.is_file() {
      return Ok(candidate.clone());
    }
  }
  let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
  Err(Error::ConfigNotFound(tried.join(", ")))
}

pub fn load_config_file(path: &Path) -> Result<LoggingConfig> {
  let contents = fs::read_to_string(path)?;
  parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<LoggingConfig> {
  let raw: raw::ConfigRaw =
    serde_yaml::from_str(contents).map_err(|e| Error::ConfigParse(e.to_string()))?;
  process_raw_config(raw)
}
