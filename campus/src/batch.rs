//! Atomic multi-document moderation writes.

use crate::error::StoreError;
use crate::store::{DocumentStore, FieldValue, WriteFields, WriteOp};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
  Pending,
  Approved,
  Rejected,
}

impl ReviewStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ReviewStatus::Pending => "pending",
      ReviewStatus::Approved => "approved",
      ReviewStatus::Rejected => "rejected",
    }
  }
}

impl fmt::Display for ReviewStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Optional fields of a status update. Absent options leave the stored
/// fields untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
  pub highlighted: Option<bool>,
  pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
  pub target_id: String,
  pub status: ReviewStatus,
  pub options: UpdateOptions,
}

impl StatusUpdate {
  pub fn new(target_id: impl Into<String>, status: ReviewStatus) -> Self {
    Self {
      target_id: target_id.into(),
      status,
      options: UpdateOptions::default(),
    }
  }

  pub fn highlighted(mut self, highlighted: bool) -> Self {
    self.options.highlighted = Some(highlighted);
    self
  }

  pub fn rejection_reason(mut self, reason: impl Into<String>) -> Self {
    self.options.rejection_reason = Some(reason.into());
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
  pub success: bool,
  /// Number of documents updated. Always 0 when `success` is false.
  pub applied: usize,
  pub error: Option<String>,
}

impl BatchOutcome {
  fn applied(applied: usize) -> Self {
    Self {
      success: true,
      applied,
      error: None,
    }
  }

  fn failed(error: &StoreError) -> Self {
    Self {
      success: false,
      applied: 0,
      error: Some(error.to_string()),
    }
  }
}

/// Applies moderation status updates to one collection in a single commit.
#[derive(Clone)]
pub struct BatchWriter {
  store: Arc<dyn DocumentStore>,
  collection: String,
  max_writes: usize,
}

impl fmt::Debug for BatchWriter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BatchWriter")
      .field("collection", &self.collection)
      .field("max_writes", &self.max_writes)
      .finish_non_exhaustive()
  }
}

impl BatchWriter {
  pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>, max_writes: usize) -> Self {
    Self {
      store,
      collection: collection.into(),
      max_writes,
    }
  }

  pub fn collection(&self) -> &str {
    &self.collection
  }

  /// Applies all of `updates` or none of them.
  ///
  /// An empty list succeeds without touching the store. A list longer than
  /// the store's commit limit is refused whole.
  pub async fn apply(&self, reviewer: &str, updates: &[StatusUpdate]) -> BatchOutcome {
    if updates.is_empty() {
      return BatchOutcome::applied(0);
    }
    if updates.len() > self.max_writes {
      let error = StoreError::BatchTooLarge {
        size: updates.len(),
        limit: self.max_writes,
      };
      tracing::warn!(reviewer, error = %error, "batch update refused");
      return BatchOutcome::failed(&error);
    }

    let ops = self.build_ops(reviewer, updates);
    match self.store.commit(ops).await {
      Ok(()) => {
        tracing::info!(reviewer, applied = updates.len(), collection = %self.collection, "batch update committed");
        BatchOutcome::applied(updates.len())
      }
      Err(error) => {
        tracing::warn!(reviewer, error = %error, "batch update failed");
        BatchOutcome::failed(&error)
      }
    }
  }

  fn build_ops(&self, reviewer: &str, updates: &[StatusUpdate]) -> Vec<WriteOp> {
    updates
      .iter()
      .map(|update| {
        let mut fields = WriteFields::new();
        fields.insert("status".into(), FieldValue::value(update.status.as_str()));
        fields.insert("reviewedBy".into(), FieldValue::value(reviewer));
        fields.insert("reviewedAt".into(), FieldValue::ServerTimestamp);
        if let Some(highlighted) = update.options.highlighted {
          fields.insert("highlighted".into(), FieldValue::value(highlighted));
        }
        if let Some(reason) = &update.options.rejection_reason {
          fields.insert("rejectionReason".into(), FieldValue::value(reason.as_str()));
        }
        WriteOp::Update {
          collection: self.collection.clone(),
          id: update.target_id.clone(),
          fields,
        }
      })
      .collect()
  }
}
