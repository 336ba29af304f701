use super::raw::*;
use crate::error::ConfigError;

use std::time::Duration;

use campus_scheduler::BatchConfig;

type Result<T> = std::result::Result<T, ConfigError>;

/// A sliding-window budget: at most `max_events` inside any `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
  pub max_events: usize,
  pub window: Duration,
}

impl RateLimit {
  pub const fn new(max_events: usize, window: Duration) -> Self {
    Self { max_events, window }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
  /// Failed validations tolerated before the subject is blocked.
  pub max_failed_attempts: u32,
  /// How long a run of failed attempts is remembered, counted from its first
  /// failure.
  pub failed_attempt_window: Duration,
  /// How long a granted verdict is served without re-reading the store.
  pub cache_timeout: Duration,
  /// Verdicts older than this fail validations that require re-auth.
  pub session_timeout: Duration,
  pub sweep_interval: Duration,
  /// Profile field carrying the admin flag.
  pub admin_field: String,
  pub admin_actions: RateLimit,
  pub user_actions: RateLimit,
}

impl Default for GateConfig {
  fn default() -> Self {
    Self {
      max_failed_attempts: 5,
      failed_attempt_window: Duration::from_secs(15 * 60),
      cache_timeout: Duration::from_secs(5 * 60),
      session_timeout: Duration::from_secs(30 * 60),
      sweep_interval: Duration::from_secs(10 * 60),
      admin_field: "isAdmin".to_string(),
      admin_actions: RateLimit::new(10, Duration::from_secs(60)),
      user_actions: RateLimit::new(5, Duration::from_secs(60)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
  pub time_to_live: Duration,
  /// `None` lets the cache size its shard count from the CPU count.
  pub shards: Option<usize>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      time_to_live: campus_cache::DEFAULT_TIME_TO_LIVE,
      shards: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
  pub user_agent: String,
  pub failure_channel_capacity: usize,
}

impl Default for AuditConfig {
  fn default() -> Self {
    Self {
      user_agent: concat!("campus/", env!("CARGO_PKG_VERSION")).to_string(),
      failure_channel_capacity: 64,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
  /// Deadline applied to every store call.
  pub timeout: Duration,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(10),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionsConfig {
  pub users: String,
  pub photos: String,
  pub audit_logs: String,
}

impl Default for CollectionsConfig {
  fn default() -> Self {
    Self {
      users: "users".to_string(),
      photos: "photos".to_string(),
      audit_logs: "admin_logs".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchWriteConfig {
  /// Largest number of writes the store accepts in one commit.
  pub max_writes: usize,
}

impl Default for BatchWriteConfig {
  fn default() -> Self {
    Self { max_writes: 500 }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
  pub batching: BatchConfig,
  pub debounce_delay: Duration,
  pub throttle_interval: Duration,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      batching: BatchConfig::default(),
      debounce_delay: Duration::from_millis(300),
      throttle_interval: Duration::from_millis(100),
    }
  }
}

/// Validated configuration for a [`Campus`](crate::Campus).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
  pub gate: GateConfig,
  pub cache: CacheConfig,
  pub audit: AuditConfig,
  pub store: StoreConfig,
  pub collections: CollectionsConfig,
  pub batch: BatchWriteConfig,
  pub scheduler: SchedulerConfig,
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
  let duration = humantime::parse_duration(value).map_err(|e| ConfigError::InvalidConfigValue {
    field: field.to_string(),
    message: format!("'{value}' is not a duration: {e}"),
  })?;
  if duration.is_zero() {
    return Err(ConfigError::InvalidConfigValue {
      field: field.to_string(),
      message: "duration must be greater than zero".to_string(),
    });
  }
  Ok(duration)
}

fn duration_or(field: &str, value: Option<String>, default: Duration) -> Result<Duration> {
  match value {
    Some(v) => parse_duration(field, &v),
    None => Ok(default),
  }
}

fn positive<T: Default + PartialEq + Copy>(field: &str, value: Option<T>, default: T) -> Result<T> {
  match value {
    Some(v) if v == T::default() => Err(ConfigError::InvalidConfigValue {
      field: field.to_string(),
      message: "must be greater than zero".to_string(),
    }),
    Some(v) => Ok(v),
    None => Ok(default),
  }
}

fn non_empty(field: &str, value: Option<String>, default: String) -> Result<String> {
  match value {
    Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidConfigValue {
      field: field.to_string(),
      message: "must not be empty".to_string(),
    }),
    Some(v) => Ok(v),
    None => Ok(default),
  }
}

fn process_rate_limit(field: &str, raw: Option<RateLimitRaw>, default: RateLimit) -> Result<RateLimit> {
  let Some(raw) = raw else {
    return Ok(default);
  };
  Ok(RateLimit {
    max_events: positive(&format!("{field}.max_events"), Some(raw.max_events), 0)?,
    window: parse_duration(&format!("{field}.window"), &raw.window)?,
  })
}

fn process_gate(raw: GateConfigRaw) -> Result<GateConfig> {
  let d = GateConfig::default();
  Ok(GateConfig {
    max_failed_attempts: positive(
      "gate.max_failed_attempts",
      raw.max_failed_attempts,
      d.max_failed_attempts,
    )?,
    failed_attempt_window: duration_or(
      "gate.failed_attempt_window",
      raw.failed_attempt_window,
      d.failed_attempt_window,
    )?,
    cache_timeout: duration_or("gate.cache_timeout", raw.cache_timeout, d.cache_timeout)?,
    session_timeout: duration_or("gate.session_timeout", raw.session_timeout, d.session_timeout)?,
    sweep_interval: duration_or("gate.sweep_interval", raw.sweep_interval, d.sweep_interval)?,
    admin_field: non_empty("gate.admin_field", raw.admin_field, d.admin_field)?,
    admin_actions: process_rate_limit("gate.admin_actions", raw.admin_actions, d.admin_actions)?,
    user_actions: process_rate_limit("gate.user_actions", raw.user_actions, d.user_actions)?,
  })
}

fn process_scheduler(raw: SchedulerConfigRaw) -> Result<SchedulerConfig> {
  let d = SchedulerConfig::default();
  Ok(SchedulerConfig {
    batching: BatchConfig {
      batch_size: positive("scheduler.batch_size", raw.batch_size, d.batching.batch_size)?,
      batch_timeout: duration_or(
        "scheduler.batch_timeout",
        raw.batch_timeout,
        d.batching.batch_timeout,
      )?,
    },
    debounce_delay: duration_or("scheduler.debounce_delay", raw.debounce_delay, d.debounce_delay)?,
    throttle_interval: duration_or(
      "scheduler.throttle_interval",
      raw.throttle_interval,
      d.throttle_interval,
    )?,
  })
}

/// Turns the raw file contents into a validated [`Config`].
pub fn process_raw_config(raw: ConfigRaw) -> Result<Config> {
  let defaults = Config::default();

  let cache = CacheConfig {
    time_to_live: duration_or("cache.time_to_live", raw.cache.time_to_live, defaults.cache.time_to_live)?,
    shards: match raw.cache.shards {
      Some(shards) => Some(positive("cache.shards", Some(shards), 0)?),
      None => None,
    },
  };

  let audit = AuditConfig {
    user_agent: non_empty("audit.user_agent", raw.audit.user_agent, defaults.audit.user_agent)?,
    failure_channel_capacity: positive(
      "audit.failure_channel_capacity",
      raw.audit.failure_channel_capacity,
      defaults.audit.failure_channel_capacity,
    )?,
  };

  let collections = CollectionsConfig {
    users: non_empty("collections.users", raw.collections.users, defaults.collections.users)?,
    photos: non_empty("collections.photos", raw.collections.photos, defaults.collections.photos)?,
    audit_logs: non_empty(
      "collections.audit_logs",
      raw.collections.audit_logs,
      defaults.collections.audit_logs,
    )?,
  };

  Ok(Config {
    gate: process_gate(raw.gate)?,
    cache,
    audit,
    store: StoreConfig {
      timeout: duration_or("store.timeout", raw.store.timeout, defaults.store.timeout)?,
    },
    collections,
    batch: BatchWriteConfig {
      max_writes: positive("batch.max_writes", raw.batch.max_writes, defaults.batch.max_writes)?,
    },
    scheduler: process_scheduler(raw.scheduler)?,
  })
}
