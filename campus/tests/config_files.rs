use campus::config::{find_config_file, load_from_file, Config};
use campus::ConfigError;

use std::fs;
use std::time::Duration;

use pretty_assertions::assert_eq;

#[test]
fn environment_file_wins_over_base_file() {
  let dir = tempfile::tempdir().unwrap();
  fs::write(dir.path().join("campus.yaml"), "store:\n  timeout: 5s\n").unwrap();
  fs::write(dir.path().join("campus.staging.yaml"), "store:\n  timeout: 2s\n").unwrap();

  let path = find_config_file(dir.path(), Some("staging")).unwrap();
  assert_eq!(path, dir.path().join("campus.staging.yaml"));
  assert_eq!(load_from_file(&path).unwrap().store.timeout, Duration::from_secs(2));

  let path = find_config_file(dir.path(), Some("production")).unwrap();
  assert_eq!(path, dir.path().join("campus.yaml"));
}

#[test]
fn missing_files_are_reported() {
  let dir = tempfile::tempdir().unwrap();
  let err = find_config_file(dir.path(), Some("")).unwrap_err();
  assert!(matches!(err, ConfigError::ConfigNotFound(ref tried) if tried.ends_with("campus.yaml")));
}

#[test]
fn full_file_round_trips_into_config() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("campus.yaml");
  fs::write(
    &path,
    r#"
gate:
  max_failed_attempts: 3
  failed_attempt_window: 10m
  cache_timeout: 1m
  session_timeout: 20m
  sweep_interval: 5m
  admin_field: role_admin
  admin_actions: { max_events: 20, window: 2m }
  user_actions: { max_events: 8, window: 30s }
cache:
  time_to_live: 90s
  shards: 8
audit:
  user_agent: campus-web/2.1
  failure_channel_capacity: 16
store:
  timeout: 4s
collections:
  users: members
  photos: gallery
  audit_logs: audit
batch:
  max_writes: 100
scheduler:
  batch_size: 20
  batch_timeout: 25ms
  debounce_delay: 250ms
  throttle_interval: 1s
"#,
  )
  .unwrap();

  let config = load_from_file(&path).unwrap();
  let defaults = Config::default();
  assert_eq!(config.gate.max_failed_attempts, 3);
  assert_eq!(config.gate.failed_attempt_window, Duration::from_secs(600));
  assert_eq!(config.gate.admin_field, "role_admin");
  assert_eq!(config.gate.user_actions.max_events, 8);
  assert_eq!(config.cache.shards, Some(8));
  assert_eq!(config.cache.time_to_live, Duration::from_secs(90));
  assert_eq!(config.audit.user_agent, "campus-web/2.1");
  assert_eq!(config.collections.photos, "gallery");
  assert_eq!(config.batch.max_writes, 100);
  assert_eq!(config.scheduler.batching.batch_size, 20);
  assert_eq!(config.scheduler.batching.batch_timeout, Duration::from_millis(25));
  assert_ne!(config, defaults);
}

#[test]
fn unreadable_path_is_a_read_error() {
  let dir = tempfile::tempdir().unwrap();
  let err = load_from_file(&dir.path().join("nope.yaml")).unwrap_err();
  assert!(matches!(err, ConfigError::ConfigRead(_)));
}
