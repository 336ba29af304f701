//! The document store contract the campus core is written against, plus an
//! in-process implementation and a deadline decorator.

mod memory;
mod query;
mod timeout;

pub use memory::MemoryStore;
pub use query::{Direction, Filter, FilterOp, Fingerprint, OrderBy, Query};
pub use timeout::TimeoutStore;

use crate::error::StoreError;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub type Fields = Map<String, Value>;

/// A stored document: its id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id: String,
  pub fields: Fields,
}

impl Document {
  /// Builds a document from a JSON object. Non-object values yield a
  /// document without fields.
  pub fn new(id: impl Into<String>, fields: Value) -> Self {
    let fields = match fields {
      Value::Object(map) => map,
      _ => Fields::new(),
    };
    Self {
      id: id.into(),
      fields,
    }
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.fields.get(field)
  }

  pub fn get_str(&self, field: &str) -> Option<&str> {
    self.get(field).and_then(Value::as_str)
  }

  /// Reads `field` with JavaScript-style truthiness: `false`, `null`, `0`,
  /// `""` and a missing field are all falsy.
  pub fn is_truthy(&self, field: &str) -> bool {
    match self.get(field) {
      None | Some(Value::Null) => false,
      Some(Value::Bool(b)) => *b,
      Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
      Some(Value::String(s)) => !s.is_empty(),
      Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
  }
}

/// A value to be written. `ServerTimestamp` is resolved by the store at
/// commit time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Value(Value),
  ServerTimestamp,
}

impl FieldValue {
  pub fn value(v: impl Into<Value>) -> Self {
    FieldValue::Value(v.into())
  }
}

pub type WriteFields = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
  /// Merge into an existing document instead of replacing it.
  pub merge: bool,
}

/// One write of an atomic [`DocumentStore::commit`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
  Set {
    collection: String,
    id: String,
    fields: WriteFields,
    options: SetOptions,
  },
  /// Fails the whole commit if the document does not exist.
  Update {
    collection: String,
    id: String,
    fields: WriteFields,
  },
  Delete {
    collection: String,
    id: String,
  },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

  async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

  async fn set(
    &self,
    collection: &str,
    id: &str,
    fields: WriteFields,
    options: SetOptions,
  ) -> Result<(), StoreError>;

  async fn update(&self, collection: &str, id: &str, fields: WriteFields) -> Result<(), StoreError>;

  /// Creates a document with a store-assigned id and returns that id.
  async fn add(&self, collection: &str, fields: WriteFields) -> Result<String, StoreError>;

  /// Applies every op or none of them.
  async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    (**self).get(collection, id).await
  }

  async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
    (**self).query(query).await
  }

  async fn set(
    &self,
    collection: &str,
    id: &str,
    fields: WriteFields,
    options: SetOptions,
  ) -> Result<(), StoreError> {
    (**self).set(collection, id, fields, options).await
  }

  async fn update(&self, collection: &str, id: &str, fields: WriteFields) -> Result<(), StoreError> {
    (**self).update(collection, id, fields).await
  }

  async fn add(&self, collection: &str, fields: WriteFields) -> Result<String, StoreError> {
    (**self).add(collection, fields).await
  }

  async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
    (**self).commit(ops).await
  }
}
