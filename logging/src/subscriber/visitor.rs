use crate::model::{LogEvent, LogValue};
use std::fmt;
use tracing::field::{Field, Visit};

/// Copies the fields of a `tracing` event into a `LogEvent`. The `message`
/// field becomes `LogEvent::message`.
pub(crate) struct LogEventFieldVisitor<'a> {
  event: &'a mut LogEvent,
}

impl<'a> LogEventFieldVisitor<'a> {
  pub(crate) fn new(event: &'a mut LogEvent) -> Self {
    Self { event }
  }

  fn record(&mut self, field: &Field, value: LogValue) {
    if field.name() == "message" {
      self.event.message = Some(value.to_string());
    } else {
      self.event.fields.insert(field.name().to_string(), value);
    }
  }
}

impl Visit for LogEventFieldVisitor<'_> {
  fn record_str(&mut self, field: &Field, value: &str) {
    self.record(field, LogValue::String(value.to_string()));
  }

  fn record_i64(&mut self, field: &Field, value: i64) {
    self.record(field, LogValue::Int(value));
  }

  fn record_u64(&mut self, field: &Field, value: u64) {
    match i64::try_from(value) {
      Ok(v) => self.record(field, LogValue::Int(v)),
      Err(_) => self.record(field, LogValue::Debug(value.to_string())),
    }
  }

  fn record_f64(&mut self, field: &Field, value: f64) {
    self.record(field, LogValue::Float(value));
  }

  fn record_bool(&mut self, field: &Field, value: bool) {
    self.record(field, LogValue::Bool(value));
  }

  fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
    self.record(field, LogValue::Debug(format!("{value:?}")));
  }
}
