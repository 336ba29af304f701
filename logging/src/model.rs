use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::Level;

/// A loggable value, part of a `LogEvent`'s fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogValue {
  String(String),
  Int(i64),
  Float(f64),
  Bool(bool),
  Debug(String),
}

impl fmt::Display for LogValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogValue::String(s) | LogValue::Debug(s) => f.write_str(s),
      LogValue::Int(i) => write!(f, "{i}"),
      LogValue::Float(x) => write!(f, "{x}"),
      LogValue::Bool(b) => write!(f, "{b}"),
    }
  }
}

/// The structured form of a `tracing` event handed to encoders.
#[derive(Debug, Clone)]
pub struct LogEvent {
  /// When the event was observed.
  pub timestamp: DateTime<Utc>,
  pub level: Level,
  /// Module path or explicit target of the event.
  pub target: String,
  pub name: String,
  /// The `message` field, if the event had one.
  pub message: Option<String>,
  /// Every other field recorded on the event.
  pub fields: HashMap<String, LogValue>,
  /// Name of the innermost span the event was emitted in.
  pub span: Option<String>,
  pub thread_name: Option<String>,
}

impl LogEvent {
  pub fn new<S1, S2>(level: Level, target: S1, name: S2, message: Option<String>) -> Self
  where
    S1: Into<String>,
    S2: Into<String>,
  {
    LogEvent {
      timestamp: Utc::now(),
      level,
      target: target.into(),
      name: name.into(),
      message,
      fields: HashMap::new(),
      span: None,
      thread_name: None,
    }
  }
}
