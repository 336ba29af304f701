use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub uid: String,
  pub email: Option<String>,
  pub display_name: Option<String>,
}

impl Session {
  pub fn new(uid: impl Into<String>) -> Self {
    Self {
      uid: uid.into(),
      email: None,
      display_name: None,
    }
  }

  pub fn with_email(mut self, email: impl Into<String>) -> Self {
    self.email = Some(email.into());
    self
  }
}

pub trait AuthProvider: Send + Sync {
  fn current_session(&self) -> Option<Session>;

  /// Observes sign-in and sign-out transitions.
  fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

/// An [`AuthProvider`] driven directly by the embedding application.
pub struct SessionHandle {
  tx: watch::Sender<Option<Session>>,
}

impl SessionHandle {
  pub fn new() -> Self {
    let (tx, _) = watch::channel(None);
    Self { tx }
  }

  pub fn signed_in(session: Session) -> Self {
    let handle = Self::new();
    handle.sign_in(session);
    handle
  }

  pub fn sign_in(&self, session: Session) {
    tracing::debug!(uid = %session.uid, "session started");
    self.tx.send_replace(Some(session));
  }

  /// Ends the current session, returning it if there was one.
  pub fn sign_out(&self) -> Option<Session> {
    let previous = self.tx.send_replace(None);
    if let Some(session) = &previous {
      tracing::debug!(uid = %session.uid, "session ended");
    }
    previous
  }
}

impl Default for SessionHandle {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for SessionHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SessionHandle")
      .field("session", &*self.tx.borrow())
      .finish()
  }
}

impl AuthProvider for SessionHandle {
  fn current_session(&self) -> Option<Session> {
    self.tx.borrow().clone()
  }

  fn subscribe(&self) -> watch::Receiver<Option<Session>> {
    self.tx.subscribe()
  }
}
