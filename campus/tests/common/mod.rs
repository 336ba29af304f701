#![allow(dead_code)]

use campus::store::{
  Document, DocumentStore, MemoryStore, Query, SetOptions, WriteFields, WriteOp,
};
use campus::{AuditFailures, Campus, Config, Session, SessionHandle, StoreError};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

pub const ADMIN: &str = "u-admin";
pub const STUDENT: &str = "u-student";
pub const GHOST: &str = "u-ghost";

/// A [`MemoryStore`] that counts calls and can be told to fail or hang.
#[derive(Default)]
pub struct ScriptedStore {
  pub inner: MemoryStore,
  calls: Mutex<HashMap<&'static str, usize>>,
  failures: Mutex<HashMap<&'static str, StoreError>>,
  hanging: Mutex<bool>,
}

impl ScriptedStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn calls(&self, call: &str) -> usize {
    self.calls.lock().unwrap().get(call).copied().unwrap_or(0)
  }

  pub fn fail(&self, call: &'static str, error: StoreError) {
    self.failures.lock().unwrap().insert(call, error);
  }

  pub fn recover(&self) {
    self.failures.lock().unwrap().clear();
    *self.hanging.lock().unwrap() = false;
  }

  pub fn hang(&self) {
    *self.hanging.lock().unwrap() = true;
  }

  async fn enter(&self, call: &'static str) -> Result<(), StoreError> {
    *self.calls.lock().unwrap().entry(call).or_default() += 1;
    let hanging = *self.hanging.lock().unwrap();
    if hanging {
      std::future::pending::<()>().await;
    }
    match self.failures.lock().unwrap().get(call) {
      Some(error) => Err(error.clone()),
      None => Ok(()),
    }
  }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    self.enter("get").await?;
    self.inner.get(collection, id).await
  }

  async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
    self.enter("query").await?;
    self.inner.query(query).await
  }

  async fn set(
    &self,
    collection: &str,
    id: &str,
    fields: WriteFields,
    options: SetOptions,
  ) -> Result<(), StoreError> {
    self.enter("set").await?;
    self.inner.set(collection, id, fields, options).await
  }

  async fn update(&self, collection: &str, id: &str, fields: WriteFields) -> Result<(), StoreError> {
    self.enter("update").await?;
    self.inner.update(collection, id, fields).await
  }

  async fn add(&self, collection: &str, fields: WriteFields) -> Result<String, StoreError> {
    self.enter("add").await?;
    self.inner.add(collection, fields).await
  }

  async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
    self.enter("commit").await?;
    self.inner.commit(ops).await
  }
}

/// Store seeded with one admin, one student and three pending photos.
pub fn seeded_store() -> Arc<ScriptedStore> {
  let store = ScriptedStore::new();
  store.inner.insert("users", ADMIN, json!({"displayName": "Ada", "isAdmin": true}));
  store.inner.insert("users", STUDENT, json!({"displayName": "Sam", "isAdmin": false}));
  for id in ["p1", "p2", "p3"] {
    store.inner.insert("photos", id, json!({"status": "pending", "likes": 0}));
  }
  Arc::new(store)
}

pub struct Harness {
  pub store: Arc<ScriptedStore>,
  pub auth: Arc<SessionHandle>,
  pub campus: Campus,
  pub failures: AuditFailures,
}

pub fn harness_with(config: Config, signed_in: Option<&str>) -> Harness {
  let store = seeded_store();
  let auth = Arc::new(match signed_in {
    Some(uid) => SessionHandle::signed_in(Session::new(uid)),
    None => SessionHandle::new(),
  });
  let (campus, failures) = Campus::builder(store.clone(), auth.clone())
    .config(config)
    .build()
    .expect("default configuration builds");
  Harness {
    store,
    auth,
    campus,
    failures,
  }
}

pub fn harness(signed_in: Option<&str>) -> Harness {
  harness_with(Config::default(), signed_in)
}

/// Lets spawned background work (audit writes, session watcher) run.
pub async fn settle() {
  tokio::time::sleep(Duration::from_millis(1)).await;
}
