use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// A cached admin verdict and when it was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminVerdict {
  pub is_admin: bool,
  pub validated_at: Instant,
}

impl AdminVerdict {
  pub fn age(&self) -> Duration {
    Instant::now().saturating_duration_since(self.validated_at)
  }
}

#[derive(Debug)]
pub struct VerdictCache {
  ttl: Duration,
  entries: DashMap<String, AdminVerdict>,
}

impl VerdictCache {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      entries: DashMap::new(),
    }
  }

  /// Returns the verdict for `user_id` if it is younger than the cache TTL.
  /// A stale verdict is removed.
  pub fn get_fresh(&self, user_id: &str) -> Option<AdminVerdict> {
    let verdict = *self.entries.get(user_id)?;
    if verdict.age() < self.ttl {
      return Some(verdict);
    }
    self
      .entries
      .remove_if(user_id, |_, v| v.age() >= self.ttl);
    None
  }

  pub fn store(&self, user_id: &str, is_admin: bool) {
    self.entries.insert(
      user_id.to_string(),
      AdminVerdict {
        is_admin,
        validated_at: Instant::now(),
      },
    );
  }

  pub fn remove(&self, user_id: &str) -> bool {
    self.entries.remove(user_id).is_some()
  }

  pub fn clear(&self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn sweep(&self) -> usize {
    let before = self.entries.len();
    self.entries.retain(|_, v| v.age() < self.ttl);
    before.saturating_sub(self.entries.len())
  }
}
