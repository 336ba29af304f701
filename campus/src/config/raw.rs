use serde::Deserialize;

/// On-disk shape of the campus configuration file. Every section and field is
/// optional; processing fills in defaults.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigRaw {
  #[serde(default)]
  pub gate: GateConfigRaw,
  #[serde(default)]
  pub cache: CacheConfigRaw,
  #[serde(default)]
  pub audit: AuditConfigRaw,
  #[serde(default)]
  pub store: StoreConfigRaw,
  #[serde(default)]
  pub collections: CollectionsConfigRaw,
  #[serde(default)]
  pub batch: BatchConfigRaw,
  #[serde(default)]
  pub scheduler: SchedulerConfigRaw,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GateConfigRaw {
  pub max_failed_attempts: Option<u32>,
  pub failed_attempt_window: Option<String>,
  pub cache_timeout: Option<String>,
  pub session_timeout: Option<String>,
  pub sweep_interval: Option<String>,
  pub admin_field: Option<String>,
  pub admin_actions: Option<RateLimitRaw>,
  pub user_actions: Option<RateLimitRaw>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RateLimitRaw {
  pub max_events: usize,
  pub window: String,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CacheConfigRaw {
  pub time_to_live: Option<String>,
  pub shards: Option<usize>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AuditConfigRaw {
  pub user_agent: Option<String>,
  pub failure_channel_capacity: Option<usize>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfigRaw {
  pub timeout: Option<String>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CollectionsConfigRaw {
  pub users: Option<String>,
  pub photos: Option<String>,
  pub audit_logs: Option<String>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BatchConfigRaw {
  pub max_writes: Option<usize>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfigRaw {
  pub batch_size: Option<usize>,
  pub batch_timeout: Option<String>,
  pub debounce_delay: Option<String>,
  pub throttle_interval: Option<String>,
}
