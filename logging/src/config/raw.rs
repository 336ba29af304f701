use serde::Deserialize;
use std::collections::HashMap;

/// The logging file exactly as written.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigRaw {
  #[serde(default = "default_version")]
  pub version: u32,
  #[serde(default)]
  pub appenders: HashMap<String, AppenderConfigRaw>,
  /// Keyed by target prefix; `root` is the fallback logger.
  #[serde(default)]
  pub loggers: HashMap<String, LoggerConfigRaw>,
}

fn default_version() -> u32 {
  1
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppenderConfigRaw {
  Console {
    #[serde(default)]
    encoder: Option<EncoderConfigRaw>,
    /// Write to stderr instead of stdout.
    #[serde(default)]
    stderr: bool,
  },
  File {
    path: String,
    #[serde(default)]
    encoder: Option<EncoderConfigRaw>,
  },
  RollingFile {
    directory: String,
    file_name_prefix: String,
    #[serde(default)]
    rotation: Option<RotationRaw>,
    #[serde(default)]
    encoder: Option<EncoderConfigRaw>,
  },
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RotationRaw {
  Minutely,
  Hourly,
  Daily,
  Never,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncoderConfigRaw {
  Pattern {
    #[serde(default)]
    pattern: Option<String>,
  },
  JsonLines {
    /// Put event fields at the top level instead of under `fields`.
    #[serde(default)]
    flatten_fields: bool,
  },
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfigRaw {
  #[serde(default)]
  pub level: Option<String>,
  #[serde(default)]
  pub appenders: Vec<String>,
  #[serde(default = "default_additive")]
  pub additive: bool,
}

fn default_additive() -> bool {
  true
}
