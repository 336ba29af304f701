use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
  Eq,
  NotEq,
  Lt,
  Lte,
  Gt,
  Gte,
  In,
  ArrayContains,
}

impl FilterOp {
  fn symbol(self) -> &'static str {
    match self {
      FilterOp::Eq => "==",
      FilterOp::NotEq => "!=",
      FilterOp::Lt => "<",
      FilterOp::Lte => "<=",
      FilterOp::Gt => ">",
      FilterOp::Gte => ">=",
      FilterOp::In => " in ",
      FilterOp::ArrayContains => " contains ",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
  pub field: String,
  pub op: FilterOp,
  pub value: Value,
}

impl Filter {
  pub fn matches(&self, doc: &Document) -> bool {
    let actual = doc.get(&self.field);
    match self.op {
      FilterOp::Eq => actual == Some(&self.value),
      FilterOp::NotEq => actual.is_some_and(|v| v != &self.value),
      FilterOp::Lt => ordered(actual, &self.value, |o| o == Ordering::Less),
      FilterOp::Lte => ordered(actual, &self.value, |o| o != Ordering::Greater),
      FilterOp::Gt => ordered(actual, &self.value, |o| o == Ordering::Greater),
      FilterOp::Gte => ordered(actual, &self.value, |o| o != Ordering::Less),
      FilterOp::In => match (&self.value, actual) {
        (Value::Array(options), Some(v)) => options.contains(v),
        _ => false,
      },
      FilterOp::ArrayContains => match actual {
        Some(Value::Array(items)) => items.contains(&self.value),
        _ => false,
      },
    }
  }
}

fn ordered(actual: Option<&Value>, expected: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
  actual
    .and_then(|v| compare_values(v, expected))
    .is_some_and(accept)
}

/// Orders two scalar values of the same kind. Mixed kinds do not compare.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
    (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
    (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
    (Value::Null, Value::Null) => Some(Ordering::Equal),
    _ => None,
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Asc,
  Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
  pub field: String,
  pub direction: Direction,
}

/// A read against one collection.
///
/// ```
/// use campus::store::{Direction, FilterOp, Query};
/// use serde_json::json;
///
/// let query = Query::collection("photos")
///   .filter("status", FilterOp::Eq, json!("approved"))
///   .order_by("createdAt", Direction::Desc)
///   .limit(12);
/// assert_eq!(
///   query.fingerprint().as_str(),
///   r#""photos"|"status"=="approved"|order "createdAt":desc|limit=12"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
  pub collection: String,
  pub filters: Vec<Filter>,
  pub order: Option<OrderBy>,
  /// Id of the last document of the previous page.
  pub cursor: Option<String>,
  pub limit: Option<usize>,
}

impl Query {
  pub fn collection(name: impl Into<String>) -> Self {
    Self {
      collection: name.into(),
      filters: Vec::new(),
      order: None,
      cursor: None,
      limit: None,
    }
  }

  pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: Value) -> Self {
    self.filters.push(Filter {
      field: field.into(),
      op,
      value,
    });
    self
  }

  pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
    self.order = Some(OrderBy {
      field: field.into(),
      direction,
    });
    self
  }

  pub fn start_after(mut self, cursor: impl Into<String>) -> Self {
    self.cursor = Some(cursor.into());
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn matches(&self, doc: &Document) -> bool {
    self.filters.iter().all(|filter| filter.matches(doc))
  }

  /// Builds the cache key for this query.
  ///
  /// Filters are rendered in sorted order, so two queries that differ only in
  /// the order their filters were added share a fingerprint. Every free-form
  /// part (collection, field names, values, cursor) is written as a quoted
  /// JSON string, so separators inside ids cannot make two queries collide.
  pub fn fingerprint(&self) -> Fingerprint {
    let mut filters: Vec<String> = self
      .filters
      .iter()
      .map(|f| format!("{}{}{}", quoted(&f.field), f.op.symbol(), f.value))
      .collect();
    filters.sort();

    let mut parts = Vec::with_capacity(filters.len() + 4);
    parts.push(quoted(&self.collection));
    parts.extend(filters);
    if let Some(order) = &self.order {
      let direction = match order.direction {
        Direction::Asc => "asc",
        Direction::Desc => "desc",
      };
      parts.push(format!("order {}:{}", quoted(&order.field), direction));
    }
    if let Some(cursor) = &self.cursor {
      parts.push(format!("after {}", quoted(cursor)));
    }
    if let Some(limit) = self.limit {
      parts.push(format!("limit={limit}"));
    }
    Fingerprint {
      key: parts.join("|"),
      collection: self.collection.clone(),
    }
  }
}

fn quoted(text: &str) -> String {
  Value::from(text).to_string()
}

/// Deterministic cache key derived from a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
  key: String,
  collection: String,
}

impl Fingerprint {
  pub fn as_str(&self) -> &str {
    &self.key
  }

  /// The collection the fingerprinted query reads from.
  pub fn collection(&self) -> &str {
    &self.collection
  }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.key)
  }
}

impl Serialize for Fingerprint {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.key)
  }
}
