use crate::config::RateLimit;

use std::collections::VecDeque;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// Result of asking a [`SlidingWindow`] for room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
  /// The event was recorded. `remaining` more fit in the current window.
  Allowed { remaining: usize },
  /// The window is full; the oldest event leaves it after `retry_after`.
  Limited { retry_after: Duration },
}

impl RateDecision {
  pub fn is_allowed(&self) -> bool {
    matches!(self, RateDecision::Allowed { .. })
  }
}

/// Per-(user, action) sliding-window rate limiter.
///
/// Each subject keeps the timestamps of its accepted events in arrival order.
/// Timestamps at least `window` old are pruned before every count.
#[derive(Debug)]
pub struct SlidingWindow {
  limit: RateLimit,
  events: DashMap<(String, String), VecDeque<Instant>>,
}

fn prune(events: &mut VecDeque<Instant>, now: Instant, window: Duration) {
  while let Some(oldest) = events.front() {
    if now.saturating_duration_since(*oldest) >= window {
      events.pop_front();
    } else {
      break;
    }
  }
}

impl SlidingWindow {
  pub fn new(limit: RateLimit) -> Self {
    Self {
      limit,
      events: DashMap::new(),
    }
  }

  pub fn limit(&self) -> RateLimit {
    self.limit
  }

  /// Records an event for `user_id` doing `action` if the window has room.
  ///
  /// A rejected event is not recorded, so it does not push the window out.
  pub fn check_and_record(&self, user_id: &str, action: &str) -> RateDecision {
    let now = Instant::now();
    let mut events = self
      .events
      .entry((user_id.to_string(), action.to_string()))
      .or_default();
    prune(&mut events, now, self.limit.window);

    if events.len() >= self.limit.max_events {
      let retry_after = events
        .front()
        .map(|oldest| (*oldest + self.limit.window).saturating_duration_since(now))
        .unwrap_or(self.limit.window);
      return RateDecision::Limited { retry_after };
    }

    events.push_back(now);
    RateDecision::Allowed {
      remaining: self.limit.max_events - events.len(),
    }
  }

  /// Events currently inside the window for `user_id` doing `action`.
  pub fn count(&self, user_id: &str, action: &str) -> usize {
    let now = Instant::now();
    let subject = (user_id.to_string(), action.to_string());
    self.events.get(&subject).map_or(0, |events| {
      events
        .iter()
        .filter(|at| now.saturating_duration_since(**at) < self.limit.window)
        .count()
    })
  }

  /// Forgets every action window of `user_id`.
  pub fn clear_user(&self, user_id: &str) {
    self.events.retain(|(user, _), _| user != user_id);
  }

  pub fn clear(&self) {
    self.events.clear();
  }

  /// Prunes every subject and drops the ones left empty. Returns the number of
  /// subjects dropped.
  pub fn sweep(&self) -> usize {
    let now = Instant::now();
    let window = self.limit.window;
    let before = self.events.len();
    self.events.retain(|_, events| {
      prune(events, now, window);
      !events.is_empty()
    });
    before.saturating_sub(self.events.len())
  }

  pub fn subjects(&self) -> usize {
    self.events.len()
  }
}
