use super::raw::*;
use crate::error::{Error, Result};

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use tracing_core::metadata::LevelFilter;

pub const DEFAULT_PATTERN: &str = "%d [%-5p] %t - %m %X%n";
pub const ROOT_LOGGER: &str = "root";

#[derive(Debug, Clone, PartialEq)]
pub struct PatternEncoderConfig {
  pub pattern_string: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonLinesEncoderConfig {
  pub flatten_fields: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncoderInternal {
  Pattern(PatternEncoderConfig),
  JsonLines(JsonLinesEncoderConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
  Minutely,
  Hourly,
  Daily,
  Never,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppenderKind {
  Console { stderr: bool },
  File { path: PathBuf },
  RollingFile {
    directory: PathBuf,
    file_name_prefix: String,
    rotation: Rotation,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppenderInternal {
  pub name: String,
  pub kind: AppenderKind,
  pub encoder: EncoderInternal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerInternal {
  /// Target prefix, empty for the root logger.
  pub target: String,
  pub level: LevelFilter,
  /// Indices into [`LoggingConfig::appenders`].
  pub appenders: Vec<usize>,
  pub additive: bool,
}

/// A validated logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
  pub appenders: Vec<AppenderInternal>,
  /// Named loggers, most specific target first.
  pub loggers: Vec<LoggerInternal>,
  pub root: LoggerInternal,
}

impl LoggingConfig {
  /// Everything at `info` and above to stdout with the default pattern.
  pub fn console_default() -> Self {
    Self {
      appenders: vec![AppenderInternal {
        name: "console".to_string(),
        kind: AppenderKind::Console { stderr: false },
        encoder: EncoderInternal::Pattern(PatternEncoderConfig {
          pattern_string: DEFAULT_PATTERN.to_string(),
        }),
      }],
      loggers: Vec::new(),
      root: LoggerInternal {
        target: String::new(),
        level: LevelFilter::INFO,
        appenders: vec![0],
        additive: false,
      },
    }
  }
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> Error {
  Error::InvalidConfigValue {
    field: field.into(),
    message: message.into(),
  }
}

fn parse_level(field: &str, level: Option<&str>) -> Result<LevelFilter> {
  match level {
    None => Ok(LevelFilter::INFO),
    Some(level) => {
      LevelFilter::from_str(level).map_err(|_| invalid(field, format!("unknown level '{level}'")))
    }
  }
}

fn process_encoder(raw: Option<EncoderConfigRaw>) -> EncoderInternal {
  match raw {
    None | Some(EncoderConfigRaw::Pattern { pattern: None }) => {
      EncoderInternal::Pattern(PatternEncoderConfig {
        pattern_string: DEFAULT_PATTERN.to_string(),
      })
    }
    Some(EncoderConfigRaw::Pattern { pattern: Some(pattern) }) => {
      EncoderInternal::Pattern(PatternEncoderConfig {
        pattern_string: pattern,
      })
    }
    Some(EncoderConfigRaw::JsonLines { flatten_fields }) => {
      EncoderInternal::JsonLines(JsonLinesEncoderConfig { flatten_fields })
    }
  }
}

fn process_appender(name: String, raw: AppenderConfigRaw) -> Result<AppenderInternal> {
  let (kind, encoder) = match raw {
    AppenderConfigRaw::Console { encoder, stderr } => (AppenderKind::Console { stderr }, encoder),
    AppenderConfigRaw::File { path, encoder } => {
      if path.trim().is_empty() {
        return Err(invalid(format!("appenders.{name}.path"), "must not be empty"));
      }
      (AppenderKind::File { path: PathBuf::from(path) }, encoder)
    }
    AppenderConfigRaw::RollingFile {
      directory,
      file_name_prefix,
      rotation,
      encoder,
    } => {
      if file_name_prefix.trim().is_empty() {
        return Err(invalid(
          format!("appenders.{name}.file_name_prefix"),
          "must not be empty",
        ));
      }
      let rotation = match rotation.unwrap_or(RotationRaw::Daily) {
        RotationRaw::Minutely => Rotation::Minutely,
        RotationRaw::Hourly => Rotation::Hourly,
        RotationRaw::Daily => Rotation::Daily,
        RotationRaw::Never => Rotation::Never,
      };
      let kind = AppenderKind::RollingFile {
        directory: PathBuf::from(directory),
        file_name_prefix,
        rotation,
      };
      (kind, encoder)
    }
  };
  Ok(AppenderInternal {
    name,
    kind,
    encoder: process_encoder(encoder),
  })
}

fn process_logger(
  target: &str,
  raw: &LoggerConfigRaw,
  index_of: &HashMap<&str, usize>,
) -> Result<LoggerInternal> {
  let field = format!("loggers.{target}");
  let appenders = raw
    .appenders
    .iter()
    .map(|name| {
      index_of
        .get(name.as_str())
        .copied()
        .ok_or_else(|| invalid(format!("{field}.appenders"), format!("unknown appender '{name}'")))
    })
    .collect::<Result<Vec<_>>>()?;
  Ok(LoggerInternal {
    target: if target == ROOT_LOGGER {
      String::new()
    } else {
      target.to_string()
    },
    level: parse_level(&format!("{field}.level"), raw.level.as_deref())?,
    appenders,
    additive: raw.additive,
  })
}

/// Validates a raw configuration.
///
/// A missing `root` logger defaults to `info` on every configured appender.
pub fn process_raw_config(raw: ConfigRaw) -> Result<LoggingConfig> {
  if raw.version != 1 {
    return Err(invalid("version", format!("unsupported version {}", raw.version)));
  }

  let mut names: Vec<String> = raw.appenders.keys().cloned().collect();
  names.sort();
  let mut raw_appenders = raw.appenders;
  let mut appenders = Vec::with_capacity(names.len());
  for name in &names {
    if let Some(appender) = raw_appenders.remove(name) {
      appenders.push(process_appender(name.clone(), appender)?);
    }
  }

  let index_of: HashMap<&str, usize> = names
    .iter()
    .enumerate()
    .map(|(i, name)| (name.as_str(), i))
    .collect();

  let root = match raw.loggers.get(ROOT_LOGGER) {
    Some(root) => process_logger(ROOT_LOGGER, root, &index_of)?,
    None => LoggerInternal {
      target: String::new(),
      level: LevelFilter::INFO,
      appenders: (0..appenders.len()).collect(),
      additive: false,
    },
  };

  let mut loggers = raw
    .loggers
    .iter()
    .filter(|(target, _)| target.as_str() != ROOT_LOGGER)
    .map(|(target, logger)| process_logger(target, logger, &index_of))
    .collect::<Result<Vec<_>>>()?;
  loggers.sort_by(|a, b| b.target.len().cmp(&a.target.len()).then_with(|| a.target.cmp(&b.target)));

  Ok(LoggingConfig {
    appenders,
    loggers,
    root,
  })
}
