use crate::audit::{AuditFailures, AuditLog};
use crate::auth::AuthProvider;
use crate::batch::BatchWriter;
use crate::config::{self, Config};
use crate::error::Error;
use crate::gate::{AdminGate, Janitor};
use crate::moderation::Moderation;
use crate::queries::CachedQueries;
use crate::store::{DocumentStore, TimeoutStore};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use campus_scheduler::{Batcher, RequestScheduler, TaskSpawner, TokioSpawner};

/// Assembles a [`Campus`] from its collaborators.
pub struct CampusBuilder {
  store: Arc<dyn DocumentStore>,
  auth: Arc<dyn AuthProvider>,
  config: Config,
  spawner: Option<Arc<dyn TaskSpawner>>,
}

impl fmt::Debug for CampusBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CampusBuilder")
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

impl CampusBuilder {
  pub fn config(mut self, config: Config) -> Self {
    self.config = config;
    self
  }

  /// Loads `campus.<env>.yaml` or `campus.yaml` from `dir`, replacing any
  /// configuration set so far.
  pub fn config_dir(self, dir: &Path, env_suffix: Option<&str>) -> Result<Self, Error> {
    let path = config::find_config_file(dir, env_suffix)?;
    let config = config::load_from_file(&path)?;
    Ok(self.config(config))
  }

  /// Runtime used for audit writes, timers and background sweeps. Defaults to
  /// the current Tokio runtime.
  pub fn spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
    self.spawner = Some(spawner);
    self
  }

  /// Wires every service and starts the gate janitor and session watcher.
  ///
  /// Without an explicit spawner this must run inside a Tokio runtime.
  pub fn build(self) -> Result<(Campus, AuditFailures), Error> {
    let config = self.config;
    let spawner = self
      .spawner
      .unwrap_or_else(|| Arc::new(TokioSpawner::new()));

    let store: Arc<dyn DocumentStore> = Arc::new(TimeoutStore::new(self.store, config.store.timeout));

    let (audit, failures) = AuditLog::new(
      store.clone(),
      config.collections.audit_logs.clone(),
      &config.audit,
      spawner.clone(),
    );

    let gate = Arc::new(AdminGate::new(
      config.gate.clone(),
      config.collections.users.clone(),
      store.clone(),
      self.auth.clone(),
      audit.clone(),
    ));
    let janitor = gate.spawn_janitor(config.gate.sweep_interval, spawner.as_ref());
    gate.watch_sessions(spawner.as_ref());

    let queries = CachedQueries::with_ttl(store.clone(), config.cache.time_to_live, config.cache.shards)?;
    let writer = BatchWriter::new(store.clone(), config.collections.photos.clone(), config.batch.max_writes);
    let moderation = Moderation::new(gate.clone(), writer.clone(), queries.clone(), audit.clone());
    let scheduler = RequestScheduler::with_spawner(spawner.clone());

    tracing::info!(
      store_timeout = ?config.store.timeout,
      cache_ttl = ?config.cache.time_to_live,
      "campus services ready"
    );

    let campus = Campus {
      config,
      store,
      auth: self.auth,
      spawner,
      gate,
      audit,
      queries,
      writer,
      moderation,
      scheduler,
      janitor,
    };
    Ok((campus, failures))
  }
}

/// One wired instance of every campus service.
pub struct Campus {
  config: Config,
  store: Arc<dyn DocumentStore>,
  auth: Arc<dyn AuthProvider>,
  spawner: Arc<dyn TaskSpawner>,
  gate: Arc<AdminGate>,
  audit: AuditLog,
  queries: CachedQueries,
  writer: BatchWriter,
  moderation: Moderation,
  scheduler: RequestScheduler,
  janitor: Janitor,
}

impl fmt::Debug for Campus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Campus")
      .field("config", &self.config)
      .field("gate", &self.gate)
      .field("queries", &self.queries)
      .finish_non_exhaustive()
  }
}

impl Campus {
  pub fn builder(store: Arc<dyn DocumentStore>, auth: Arc<dyn AuthProvider>) -> CampusBuilder {
    CampusBuilder {
      store,
      auth,
      config: Config::default(),
      spawner: None,
    }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// The store every service talks to, with the configured deadline applied.
  pub fn store(&self) -> &Arc<dyn DocumentStore> {
    &self.store
  }

  pub fn auth(&self) -> &Arc<dyn AuthProvider> {
    &self.auth
  }

  pub fn gate(&self) -> &Arc<AdminGate> {
    &self.gate
  }

  pub fn audit(&self) -> &AuditLog {
    &self.audit
  }

  pub fn queries(&self) -> &CachedQueries {
    &self.queries
  }

  pub fn writer(&self) -> &BatchWriter {
    &self.writer
  }

  pub fn moderation(&self) -> &Moderation {
    &self.moderation
  }

  pub fn scheduler(&self) -> &RequestScheduler {
    &self.scheduler
  }

  /// A request batcher using the configured size and timeout.
  pub fn batcher<A, R>(&self) -> Batcher<A, R>
  where
    A: PartialEq + Clone + Send + 'static,
    R: Clone + Send + 'static,
  {
    Batcher::with_spawner(self.config.scheduler.batching, self.spawner.clone())
  }

  /// Stops background work and drops all cached and per-user state.
  pub fn shutdown(&self) {
    self.janitor.stop();
    self.scheduler.clear_all();
    self.gate.clear_all();
    self.queries.clear();
    tracing::debug!("campus services shut down");
  }
}
