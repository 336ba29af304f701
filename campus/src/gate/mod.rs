//! Admin authorization gate.
//!
//! Per subject the gate moves between three states: unvalidated, holding a
//! cached verdict (until `cache_timeout` passes), and blocked (once the
//! failed-attempt run reaches `max_failed_attempts`, until the run expires).

mod attempts;
mod janitor;
mod verdict;
mod window;

pub use attempts::FailedAttempts;
pub use janitor::Janitor;
pub use verdict::{AdminVerdict, VerdictCache};
pub use window::{RateDecision, SlidingWindow};

use crate::audit::{AuditLog, AuditStatus};
use crate::auth::AuthProvider;
use crate::config::GateConfig;
use crate::store::DocumentStore;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use campus_scheduler::TaskSpawner;
use serde::Serialize;
use serde_json::{json, Value};

/// Why the gate refused a request. `Display` gives the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
  NotAuthenticated,
  TooManyFailedAttempts,
  ReauthRequired,
  NotAdmin,
  ProfileMissing,
  Upstream,
}

impl fmt::Display for DenyReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let message = match self {
      DenyReason::NotAuthenticated => "No authenticated user",
      DenyReason::TooManyFailedAttempts => "Too many failed attempts. Please try again later.",
      DenyReason::ReauthRequired => "Session expired. Please sign in again.",
      DenyReason::NotAdmin => "Insufficient privileges",
      DenyReason::ProfileMissing => "User profile not found",
      DenyReason::Upstream => "Unable to verify admin privileges",
    };
    f.write_str(message)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
  Cache,
  Store,
}

/// Outcome of [`AdminGate::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Granted { source: VerdictSource },
  Denied { reason: DenyReason },
}

impl Verdict {
  pub fn is_admin(&self) -> bool {
    matches!(self, Verdict::Granted { .. })
  }

  pub fn reason(&self) -> Option<DenyReason> {
    match self {
      Verdict::Granted { .. } => None,
      Verdict::Denied { reason } => Some(*reason),
    }
  }
}

/// Outcome of [`AdminGate::validate_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionDecision {
  Allowed { remaining: usize },
  Denied { reason: DenyReason },
  RateLimited { retry_after: Duration },
}

impl ActionDecision {
  pub fn is_allowed(&self) -> bool {
    matches!(self, ActionDecision::Allowed { .. })
  }

  pub fn retry_after(&self) -> Option<Duration> {
    match self {
      ActionDecision::RateLimited { retry_after } => Some(*retry_after),
      _ => None,
    }
  }

  /// User-facing message for a refused action.
  pub fn message(&self) -> Option<String> {
    match self {
      ActionDecision::Allowed { .. } => None,
      ActionDecision::Denied { reason } => Some(reason.to_string()),
      ActionDecision::RateLimited { .. } => Some("Rate limit exceeded".to_string()),
    }
  }
}

/// Decides whether the signed-in user may perform privileged actions.
pub struct AdminGate {
  config: GateConfig,
  users: String,
  store: Arc<dyn DocumentStore>,
  auth: Arc<dyn AuthProvider>,
  audit: AuditLog,
  verdicts: VerdictCache,
  failures: FailedAttempts,
  admin_actions: SlidingWindow,
  user_actions: SlidingWindow,
}

impl fmt::Debug for AdminGate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AdminGate")
      .field("config", &self.config)
      .field("users", &self.users)
      .field("cached_verdicts", &self.verdicts.len())
      .finish_non_exhaustive()
  }
}

impl AdminGate {
  pub fn new(
    config: GateConfig,
    users: impl Into<String>,
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    audit: AuditLog,
  ) -> Self {
    Self {
      verdicts: VerdictCache::new(config.cache_timeout),
      failures: FailedAttempts::new(config.failed_attempt_window),
      admin_actions: SlidingWindow::new(config.admin_actions),
      user_actions: SlidingWindow::new(config.user_actions),
      users: users.into(),
      config,
      store,
      auth,
      audit,
    }
  }

  pub fn config(&self) -> &GateConfig {
    &self.config
  }

  /// Checks that `user_id` is the signed-in user and holds admin privileges.
  ///
  /// With `require_reauth`, a cached verdict older than `session_timeout` is
  /// refused. Store failures, including timeouts, deny and count as a failed
  /// attempt.
  pub async fn validate(&self, user_id: &str, require_reauth: bool) -> Verdict {
    let signed_in = self
      .auth
      .current_session()
      .is_some_and(|session| session.uid == user_id);
    if !signed_in {
      tracing::warn!(user_id, "admin validation without a matching session");
      return Verdict::Denied {
        reason: DenyReason::NotAuthenticated,
      };
    }

    let failed = self.failures.count(user_id);
    if failed >= self.config.max_failed_attempts {
      tracing::warn!(user_id, failed, "admin validation blocked");
      return Verdict::Denied {
        reason: DenyReason::TooManyFailedAttempts,
      };
    }

    if let Some(cached) = self.verdicts.get_fresh(user_id) {
      if require_reauth && cached.age() > self.config.session_timeout {
        return Verdict::Denied {
          reason: DenyReason::ReauthRequired,
        };
      }
      if cached.is_admin {
        tracing::debug!(user_id, "admin verdict served from cache");
        return Verdict::Granted {
          source: VerdictSource::Cache,
        };
      }
    }

    let reason = match self.store.get(&self.users, user_id).await {
      Ok(Some(profile)) if profile.is_truthy(&self.config.admin_field) => {
        self.verdicts.store(user_id, true);
        self.failures.reset(user_id);
        tracing::info!(user_id, "admin privileges confirmed");
        return Verdict::Granted {
          source: VerdictSource::Store,
        };
      }
      Ok(Some(_)) => DenyReason::NotAdmin,
      Ok(None) => DenyReason::ProfileMissing,
      Err(error) => {
        tracing::warn!(user_id, error = %error, "admin profile lookup failed");
        DenyReason::Upstream
      }
    };

    let failed = self.failures.record_failure(user_id);
    tracing::warn!(user_id, failed, reason = ?reason, "admin validation denied");
    Verdict::Denied { reason }
  }

  /// Authorizes one privileged `action`: validation with re-auth, then the
  /// per-(user, action) rate window. Every attempt is audited.
  ///
  /// A denied attempt is not counted against the rate window.
  pub async fn validate_action(&self, user_id: &str, action: &str, details: Value) -> ActionDecision {
    let verdict = self.validate(user_id, true).await;
    if let Verdict::Denied { reason } = verdict {
      self.audit.record(
        user_id,
        action,
        AuditStatus::Denied,
        json!({ "reason": reason, "details": details }),
      );
      return ActionDecision::Denied { reason };
    }

    match self.admin_actions.check_and_record(user_id, action) {
      RateDecision::Allowed { remaining } => {
        self.audit.record(
          user_id,
          action,
          AuditStatus::Success,
          json!({ "remaining": remaining, "details": details }),
        );
        ActionDecision::Allowed { remaining }
      }
      RateDecision::Limited { retry_after } => {
        tracing::warn!(user_id, action, retry_after = ?retry_after, "admin action rate limited");
        self.audit.record(
          user_id,
          action,
          AuditStatus::RateLimited,
          json!({ "retryAfterMs": retry_after.as_millis() as u64, "details": details }),
        );
        ActionDecision::RateLimited { retry_after }
      }
    }
  }

  /// Generic per-(user, action) limiter for ordinary user actions such as
  /// posting, commenting and uploading.
  pub fn check_rate_limit(&self, user_id: &str, action: &str) -> RateDecision {
    let decision = self.user_actions.check_and_record(user_id, action);
    if let RateDecision::Limited { retry_after } = decision {
      tracing::debug!(user_id, action, retry_after = ?retry_after, "user action rate limited");
    }
    decision
  }

  /// Forgets everything the gate holds about `user_id`.
  pub fn clear_user(&self, user_id: &str) {
    self.verdicts.remove(user_id);
    self.failures.reset(user_id);
    self.admin_actions.clear_user(user_id);
    self.user_actions.clear_user(user_id);
    tracing::debug!(user_id, "gate state cleared for user");
  }

  pub fn clear_all(&self) {
    self.verdicts.clear();
    self.failures.clear();
    self.admin_actions.clear();
    self.user_actions.clear();
  }

  /// Drops expired verdicts, failed-attempt runs and idle rate windows.
  /// Returns the number of entries removed.
  pub fn sweep(&self) -> usize {
    self.verdicts.sweep() + self.failures.sweep() + self.admin_actions.sweep() + self.user_actions.sweep()
  }

  pub fn cached_verdict(&self, user_id: &str) -> Option<AdminVerdict> {
    self.verdicts.get_fresh(user_id)
  }

  /// Number of verdicts held, including stale ones not yet swept.
  pub fn cached_verdicts(&self) -> usize {
    self.verdicts.len()
  }

  pub fn failed_attempts(&self, user_id: &str) -> u32 {
    self.failures.count(user_id)
  }

  /// Starts a background sweep every `interval`.
  pub fn spawn_janitor(self: &Arc<Self>, interval: Duration, spawner: &dyn TaskSpawner) -> Janitor {
    Janitor::spawn(Arc::downgrade(self), interval, spawner)
  }

  /// Clears a user's gate state whenever that user signs out or another user
  /// takes over the session. The task ends when the gate or the provider's
  /// channel goes away.
  pub fn watch_sessions(self: &Arc<Self>, spawner: &dyn TaskSpawner) {
    let gate = Arc::downgrade(self);
    let mut sessions = self.auth.subscribe();
    let mut current = sessions.borrow_and_update().as_ref().map(|s| s.uid.clone());

    spawner.spawn(Box::pin(async move {
      while sessions.changed().await.is_ok() {
        let next = sessions.borrow_and_update().as_ref().map(|s| s.uid.clone());
        let Some(gate) = gate.upgrade() else {
          break;
        };
        if let Some(previous) = current.take() {
          if next.as_deref() != Some(previous.as_str()) {
            gate.clear_user(&previous);
          }
        }
        current = next;
      }
    }));
  }
}
