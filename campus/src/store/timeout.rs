use super::{Document, DocumentStore, Query, SetOptions, WriteFields, WriteOp};
use crate::error::StoreError;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

/// Wraps a store so that no call can outlive `timeout`.
///
/// An elapsed deadline surfaces as [`StoreError::Timeout`]; the inner call is
/// dropped.
#[derive(Debug, Clone)]
pub struct TimeoutStore<S> {
  inner: S,
  timeout: Duration,
}

impl<S> TimeoutStore<S> {
  pub fn new(inner: S, timeout: Duration) -> Self {
    Self { inner, timeout }
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  pub fn inner(&self) -> &S {
    &self.inner
  }

  async fn guard<T>(
    &self,
    call: &'static str,
    fut: impl Future<Output = Result<T, StoreError>>,
  ) -> Result<T, StoreError> {
    match tokio::time::timeout(self.timeout, fut).await {
      Ok(result) => result,
      Err(_) => {
        tracing::warn!(call, timeout = ?self.timeout, "store call timed out");
        Err(StoreError::Timeout(self.timeout))
      }
    }
  }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for TimeoutStore<S> {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    self.guard("get", self.inner.get(collection, id)).await
  }

  async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
    self.guard("query", self.inner.query(query)).await
  }

  async fn set(
    &self,
    collection: &str,
    id: &str,
    fields: WriteFields,
    options: SetOptions,
  ) -> Result<(), StoreError> {
    self
      .guard("set", self.inner.set(collection, id, fields, options))
      .await
  }

  async fn update(&self, collection: &str, id: &str, fields: WriteFields) -> Result<(), StoreError> {
    self.guard("update", self.inner.update(collection, id, fields)).await
  }

  async fn add(&self, collection: &str, fields: WriteFields) -> Result<String, StoreError> {
    self.guard("add", self.inner.add(collection, fields)).await
  }

  async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
    self.guard("commit", self.inner.commit(ops)).await
  }
}
