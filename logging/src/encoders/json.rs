use super::EventFormatter;
use crate::config::processed::JsonLinesEncoderConfig;
use crate::error::{Error, Result};
use crate::model::LogEvent;
use chrono::SecondsFormat;
use serde_json::{Map, Value};

/// One JSON object per line.
///
/// Keys: `timestamp`, `level`, `target`, `message`, optional `span` and
/// `thread`, and the event fields, either nested under `fields` or merged
/// into the top level when `flatten_fields` is set. A flattened field never
/// overwrites one of the fixed keys.
pub struct JsonLinesFormatter {
  config: JsonLinesEncoderConfig,
}

impl JsonLinesFormatter {
  pub fn new(config: JsonLinesEncoderConfig) -> Self {
    Self { config }
  }
}

impl EventFormatter for JsonLinesFormatter {
  fn format_event(&self, event: &LogEvent) -> Result<Vec<u8>> {
    let mut object = Map::new();
    object.insert(
      "timestamp".into(),
      Value::String(event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    object.insert("level".into(), Value::String(event.level.to_string()));
    object.insert("target".into(), Value::String(event.target.clone()));
    object.insert(
      "message".into(),
      event.message.clone().map_or(Value::Null, Value::String),
    );
    if let Some(span) = &event.span {
      object.insert("span".into(), Value::String(span.clone()));
    }
    if let Some(thread) = &event.thread_name {
      object.insert("thread".into(), Value::String(thread.clone()));
    }

    let fields = serde_json::to_value(&event.fields).map_err(|e| Error::Encode(e.to_string()))?;
    match fields {
      Value::Object(fields) if self.config.flatten_fields => {
        for (key, value) in fields {
          object.entry(key).or_insert(value);
        }
      }
      Value::Object(fields) if fields.is_empty() => {}
      fields => {
        object.insert("fields".into(), fields);
      }
    }

    let mut line = serde_json::to_vec(&Value::Object(object)).map_err(|e| Error::Encode(e.to_string()))?;
    line.push(b'\n');
    Ok(line)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::LogValue;
  use pretty_assertions::assert_eq;
  use serde_json::json;
  use tracing::Level;

  fn event() -> LogEvent {
    let mut event = LogEvent::new(Level::INFO, "campus::batch", "event", Some("committed".into()));
    event.fields.insert("applied".into(), LogValue::Int(3));
    event.fields.insert("level".into(), LogValue::String("shadowed".into()));
    event
  }

  fn parse(formatter: &JsonLinesFormatter, event: &LogEvent) -> Value {
    let bytes = formatter.format_event(event).unwrap();
    assert_eq!(bytes.last(), Some(&b'\n'));
    serde_json::from_slice(&bytes).unwrap()
  }

  #[test]
  fn nests_fields_by_default() {
    let formatter = JsonLinesFormatter::new(JsonLinesEncoderConfig { flatten_fields: false });
    let line = parse(&formatter, &event());
    assert_eq!(line["level"], json!("INFO"));
    assert_eq!(line["message"], json!("committed"));
    assert_eq!(line["fields"], json!({"applied": 3, "level": "shadowed"}));
  }

  #[test]
  fn flattened_fields_keep_fixed_keys() {
    let formatter = JsonLinesFormatter::new(JsonLinesEncoderConfig { flatten_fields: true });
    let line = parse(&formatter, &event());
    assert_eq!(line["applied"], json!(3));
    assert_eq!(line["level"], json!("INFO"));
    assert!(line.get("fields").is_none());
  }
}
