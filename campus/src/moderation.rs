//! Privileged photo moderation: authorize, write, invalidate, audit.

use crate::audit::{AuditLog, AuditStatus};
use crate::batch::{BatchOutcome, BatchWriter, StatusUpdate};
use crate::gate::{ActionDecision, AdminGate};
use crate::queries::CachedQueries;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

/// Action name checked against the admin rate window.
pub const MODERATE_ACTION: &str = "moderate_photos";
/// Action name of the audit entry describing the applied batch.
pub const BATCH_AUDIT_ACTION: &str = "batch_update_photos";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationOutcome {
  pub success: bool,
  pub applied: usize,
  /// User-facing reason when `success` is false.
  pub error: Option<String>,
  /// Set when the request was refused by the rate window.
  pub retry_after: Option<Duration>,
}

impl ModerationOutcome {
  fn refused(decision: &ActionDecision) -> Self {
    Self {
      success: false,
      applied: 0,
      error: decision.message(),
      retry_after: decision.retry_after(),
    }
  }
}

impl From<BatchOutcome> for ModerationOutcome {
  fn from(outcome: BatchOutcome) -> Self {
    Self {
      success: outcome.success,
      applied: outcome.applied,
      error: outcome.error,
      retry_after: None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct Moderation {
  gate: Arc<AdminGate>,
  writer: BatchWriter,
  queries: CachedQueries,
  audit: AuditLog,
}

impl Moderation {
  pub fn new(gate: Arc<AdminGate>, writer: BatchWriter, queries: CachedQueries, audit: AuditLog) -> Self {
    Self {
      gate,
      writer,
      queries,
      audit,
    }
  }

  /// Reviews a set of photos on behalf of `user_id`.
  ///
  /// Refused requests never reach the store. After a successful commit every
  /// cached photo query is dropped so the next read sees the new statuses.
  pub async fn review(&self, user_id: &str, updates: &[StatusUpdate]) -> ModerationOutcome {
    let decision = self
      .gate
      .validate_action(user_id, MODERATE_ACTION, json!({ "count": updates.len() }))
      .await;
    if !decision.is_allowed() {
      return ModerationOutcome::refused(&decision);
    }

    let outcome = self.writer.apply(user_id, updates).await;
    if outcome.success {
      self.queries.invalidate_collection(self.writer.collection());
    }

    let status = if outcome.success {
      AuditStatus::Success
    } else {
      AuditStatus::Failure
    };
    let targets: Vec<&str> = updates.iter().map(|u| u.target_id.as_str()).collect();
    self.audit.record(
      user_id,
      BATCH_AUDIT_ACTION,
      status,
      json!({
        "count": updates.len(),
        "applied": outcome.applied,
        "targets": targets,
        "error": outcome.error,
      }),
    );

    outcome.into()
  }
}
