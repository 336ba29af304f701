use super::query::compare_values;
use super::{Direction, Document, DocumentStore, FieldValue, Fields, Query, SetOptions, WriteFields, WriteOp};
use crate::error::StoreError;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use serde_json::Value;

type Collection = BTreeMap<String, Fields>;

/// A document store held entirely in process memory.
///
/// Every commit is applied under a single write lock after all of its ops
/// have been validated, so readers observe either none or all of it.
#[derive(Debug, Default)]
pub struct MemoryStore {
  collections: RwLock<HashMap<String, Collection>>,
  next_id: AtomicU64,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seeds a document, replacing any document with the same id.
  pub fn insert(&self, collection: &str, id: &str, fields: Value) {
    let doc = Document::new(id, fields);
    self
      .collections
      .write()
      .entry(collection.to_string())
      .or_default()
      .insert(doc.id, doc.fields);
  }

  pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
    let collections = self.collections.read();
    let fields = collections.get(collection)?.get(id)?;
    Some(Document {
      id: id.to_string(),
      fields: fields.clone(),
    })
  }

  pub fn documents(&self, collection: &str) -> Vec<Document> {
    self
      .collections
      .read()
      .get(collection)
      .map(|docs| {
        docs
          .iter()
          .map(|(id, fields)| Document {
            id: id.clone(),
            fields: fields.clone(),
          })
          .collect()
      })
      .unwrap_or_default()
  }

  pub fn len(&self, collection: &str) -> usize {
    self.collections.read().get(collection).map_or(0, BTreeMap::len)
  }

  fn generate_id(&self) -> String {
    format!("doc{:08}", self.next_id.fetch_add(1, AtomicOrdering::Relaxed) + 1)
  }
}

fn server_timestamp() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn resolve(fields: WriteFields, now: &str) -> Fields {
  fields
    .into_iter()
    .map(|(name, value)| {
      let value = match value {
        FieldValue::Value(v) => v,
        FieldValue::ServerTimestamp => Value::String(now.to_string()),
      };
      (name, value)
    })
    .collect()
}

fn apply(collections: &mut HashMap<String, Collection>, op: WriteOp, now: &str) {
  match op {
    WriteOp::Set {
      collection,
      id,
      fields,
      options,
    } => {
      let docs = collections.entry(collection).or_default();
      let resolved = resolve(fields, now);
      if options.merge {
        if let Some(existing) = docs.get_mut(&id) {
          existing.extend(resolved);
          return;
        }
      }
      docs.insert(id, resolved);
    }
    WriteOp::Update {
      collection,
      id,
      fields,
    } => {
      if let Some(existing) = collections.get_mut(&collection).and_then(|docs| docs.get_mut(&id)) {
        existing.extend(resolve(fields, now));
      }
    }
    WriteOp::Delete { collection, id } => {
      if let Some(docs) = collections.get_mut(&collection) {
        docs.remove(&id);
      }
    }
  }
}

/// Checks that every update in `ops` targets a document that exists at the
/// point the update would run.
fn validate(collections: &HashMap<String, Collection>, ops: &[WriteOp]) -> Result<(), StoreError> {
  let mut staged: HashMap<(&str, &str), bool> = HashMap::new();
  for op in ops {
    match op {
      WriteOp::Set { collection, id, .. } => {
        staged.insert((collection.as_str(), id.as_str()), true);
      }
      WriteOp::Delete { collection, id } => {
        staged.insert((collection.as_str(), id.as_str()), false);
      }
      WriteOp::Update { collection, id, .. } => {
        let exists = staged.get(&(collection.as_str(), id.as_str())).copied().unwrap_or_else(|| {
          collections
            .get(collection)
            .is_some_and(|docs| docs.contains_key(id))
        });
        if !exists {
          return Err(StoreError::NotFound {
            collection: collection.clone(),
            id: id.clone(),
          });
        }
      }
    }
  }
  Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    Ok(self.document(collection, id))
  }

  async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
    let mut docs: Vec<Document> = self
      .documents(&query.collection)
      .into_iter()
      .filter(|doc| query.matches(doc))
      .collect();

    if let Some(order) = &query.order {
      docs.sort_by(|a, b| {
        let ordering = match (a.get(&order.field), b.get(&order.field)) {
          (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
          (Some(_), None) => Ordering::Less,
          (None, Some(_)) => Ordering::Greater,
          (None, None) => Ordering::Equal,
        };
        match order.direction {
          Direction::Asc => ordering,
          Direction::Desc => ordering.reverse(),
        }
      });
    }

    if let Some(cursor) = &query.cursor {
      if let Some(pos) = docs.iter().position(|doc| &doc.id == cursor) {
        docs.drain(..=pos);
      }
    }

    if let Some(limit) = query.limit {
      docs.truncate(limit);
    }
    Ok(docs)
  }

  async fn set(
    &self,
    collection: &str,
    id: &str,
    fields: WriteFields,
    options: SetOptions,
  ) -> Result<(), StoreError> {
    self
      .commit(vec![WriteOp::Set {
        collection: collection.to_string(),
        id: id.to_string(),
        fields,
        options,
      }])
      .await
  }

  async fn update(&self, collection: &str, id: &str, fields: WriteFields) -> Result<(), StoreError> {
    self
      .commit(vec![WriteOp::Update {
        collection: collection.to_string(),
        id: id.to_string(),
        fields,
      }])
      .await
  }

  async fn add(&self, collection: &str, fields: WriteFields) -> Result<String, StoreError> {
    let id = self.generate_id();
    self.set(collection, &id, fields, SetOptions::default()).await?;
    Ok(id)
  }

  async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
    let mut collections = self.collections.write();
    validate(&collections, &ops)?;
    let now = server_timestamp();
    for op in ops {
      apply(&mut collections, op, &now);
    }
    Ok(())
  }
}
