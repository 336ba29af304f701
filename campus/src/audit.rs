//! Fire-and-forget audit trail for privileged actions.

use crate::config::AuditConfig;
use crate::error::StoreError;
use crate::store::{DocumentStore, FieldValue, WriteFields};

use std::fmt;
use std::sync::Arc;

use campus_scheduler::TaskSpawner;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

/// Replaces the value of every sensitive key in audit details.
pub const REDACTED: &str = "[REDACTED]";

// Matched case-insensitively against every key, at any depth.
const SENSITIVE_KEYS: [&str; 5] = ["password", "token", "secret", "apikey", "api_key"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
  Success,
  Failure,
  Denied,
  RateLimited,
}

impl AuditStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      AuditStatus::Success => "success",
      AuditStatus::Failure => "failure",
      AuditStatus::Denied => "denied",
      AuditStatus::RateLimited => "rate_limited",
    }
  }
}

impl fmt::Display for AuditStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

fn is_sensitive(key: &str) -> bool {
  let key = key.to_ascii_lowercase();
  SENSITIVE_KEYS.iter().any(|sensitive| key.contains(sensitive))
}

/// Returns a copy of `details` with every sensitive key's value replaced by
/// [`REDACTED`], recursing through nested objects and arrays.
pub fn redact(details: &Value) -> Value {
  match details {
    Value::Object(map) => {
      let redacted: Map<String, Value> = map
        .iter()
        .map(|(key, value)| {
          let value = if is_sensitive(key) {
            Value::String(REDACTED.to_string())
          } else {
            redact(value)
          };
          (key.clone(), value)
        })
        .collect();
      Value::Object(redacted)
    }
    Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
    other => other.clone(),
  }
}

/// One audit record, already redacted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
  pub user_id: String,
  pub action: String,
  pub status: AuditStatus,
  pub details: Value,
  pub client_timestamp: DateTime<Utc>,
  pub user_agent: String,
}

impl AuditEntry {
  pub fn new(
    user_id: &str,
    action: &str,
    status: AuditStatus,
    details: &Value,
    user_agent: &str,
  ) -> Self {
    Self {
      user_id: user_id.to_string(),
      action: action.to_string(),
      status,
      details: redact(details),
      client_timestamp: Utc::now(),
      user_agent: user_agent.to_string(),
    }
  }

  /// The stored shape of the entry. `timestamp` is assigned by the store.
  pub fn to_fields(&self) -> WriteFields {
    let mut fields = WriteFields::new();
    fields.insert("userId".into(), FieldValue::value(self.user_id.clone()));
    fields.insert("action".into(), FieldValue::value(self.action.clone()));
    fields.insert("status".into(), FieldValue::value(self.status.as_str()));
    fields.insert("details".into(), FieldValue::Value(self.details.clone()));
    fields.insert(
      "clientTimestamp".into(),
      FieldValue::value(self.client_timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    fields.insert("userAgent".into(), FieldValue::value(self.user_agent.clone()));
    fields.insert("timestamp".into(), FieldValue::ServerTimestamp);
    fields
  }
}

/// Report of an audit entry that could not be written.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditFailure {
  pub user_id: String,
  pub action: String,
  pub error: StoreError,
  pub occurred_at: DateTime<Utc>,
}

/// Receiving side of the audit failure channel.
pub type AuditFailures = mpsc::Receiver<AuditFailure>;

struct AuditInner {
  store: Arc<dyn DocumentStore>,
  collection: String,
  user_agent: String,
  spawner: Arc<dyn TaskSpawner>,
  failures: mpsc::Sender<AuditFailure>,
}

/// Appends audit entries to the audit collection without blocking callers.
#[derive(Clone)]
pub struct AuditLog {
  inner: Arc<AuditInner>,
}

impl fmt::Debug for AuditLog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AuditLog")
      .field("collection", &self.inner.collection)
      .field("user_agent", &self.inner.user_agent)
      .finish_non_exhaustive()
  }
}

impl AuditLog {
  /// Creates the log and the receiver on which write failures are reported.
  ///
  /// Reports are dropped once the channel is full or the receiver is gone.
  pub fn new(
    store: Arc<dyn DocumentStore>,
    collection: impl Into<String>,
    config: &AuditConfig,
    spawner: Arc<dyn TaskSpawner>,
  ) -> (Self, AuditFailures) {
    let (failures, receiver) = mpsc::channel(config.failure_channel_capacity.max(1));
    let log = Self {
      inner: Arc::new(AuditInner {
        store,
        collection: collection.into(),
        user_agent: config.user_agent.clone(),
        spawner,
        failures,
      }),
    };
    (log, receiver)
  }

  pub fn collection(&self) -> &str {
    &self.inner.collection
  }

  pub fn entry(&self, user_id: &str, action: &str, status: AuditStatus, details: &Value) -> AuditEntry {
    AuditEntry::new(user_id, action, status, details, &self.inner.user_agent)
  }

  /// Records an entry in the background. Never fails and never waits.
  pub fn record(&self, user_id: &str, action: &str, status: AuditStatus, details: Value) {
    let entry = self.entry(user_id, action, status, &details);
    let log = self.clone();
    self.inner.spawner.spawn(Box::pin(async move {
      if let Err(error) = log.write(&entry).await {
        log.report(entry, error);
      }
    }));
  }

  /// Writes one entry and waits for the store to accept it.
  pub async fn write(&self, entry: &AuditEntry) -> Result<(), StoreError> {
    self
      .inner
      .store
      .add(&self.inner.collection, entry.to_fields())
      .await?;
    tracing::trace!(user_id = %entry.user_id, action = %entry.action, status = %entry.status, "audit entry written");
    Ok(())
  }

  fn report(&self, entry: AuditEntry, error: StoreError) {
    tracing::warn!(
      user_id = %entry.user_id,
      action = %entry.action,
      error = %error,
      "failed to write audit entry"
    );
    let failure = AuditFailure {
      user_id: entry.user_id,
      action: entry.action,
      error,
      occurred_at: Utc::now(),
    };
    if self.inner.failures.try_send(failure).is_err() {
      tracing::debug!("audit failure channel full or closed, report dropped");
    }
  }
}
