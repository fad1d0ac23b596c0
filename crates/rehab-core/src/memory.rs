//! [`MemoryStore`]: a process-local [`DocumentStore`] for tests.
//!
//! Collections are ordered maps, so the default scan order is by key.

use std::{cmp::Ordering, collections::BTreeMap, convert::Infallible, sync::RwLock};

use serde_json::Value;

use crate::store::{Direction, Document, DocumentStore, Fields, ScanQuery, merge_fields};

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
  collections: RwLock<Collections>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> T {
    let guard = self
      .collections
      .read()
      .unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&guard)
  }

  fn write<T>(&self, f: impl FnOnce(&mut Collections) -> T) -> T {
    let mut guard = self
      .collections
      .write()
      .unwrap_or_else(std::sync::PoisonError::into_inner);
    f(&mut guard)
  }
}

/// Rank JSON types the way document stores order mixed values.
fn type_rank(value: &Value) -> u8 {
  match value {
    Value::Null => 0,
    Value::Bool(_) => 1,
    Value::Number(_) => 2,
    Value::String(_) => 3,
    Value::Array(_) => 4,
    Value::Object(_) => 5,
  }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
  match (a, b) {
    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
    (Value::Number(x), Value::Number(y)) => x
      .as_f64()
      .partial_cmp(&y.as_f64())
      .unwrap_or(Ordering::Equal),
    (Value::String(x), Value::String(y)) => x.cmp(y),
    _ => type_rank(a).cmp(&type_rank(b)),
  }
}

impl DocumentStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Infallible> {
    Ok(self.read(|cols| {
      cols
        .get(collection)
        .and_then(|docs| docs.get(id))
        .map(|fields| Document {
          id:     id.to_owned(),
          fields: fields.clone(),
        })
    }))
  }

  async fn set(
    &self,
    collection: &str,
    id: &str,
    fields: Fields,
    merge: bool,
  ) -> Result<(), Infallible> {
    self.write(|cols| {
      let docs = cols.entry(collection.to_owned()).or_default();
      match docs.get_mut(id) {
        Some(existing) if merge => merge_fields(existing, fields),
        _ => {
          docs.insert(id.to_owned(), fields);
        }
      }
    });
    Ok(())
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), Infallible> {
    self.write(|cols| {
      if let Some(docs) = cols.get_mut(collection) {
        docs.remove(id);
      }
    });
    Ok(())
  }

  async fn scan(
    &self,
    collection: &str,
    query: &ScanQuery,
  ) -> Result<Vec<Document>, Infallible> {
    let mut docs: Vec<Document> = self.read(|cols| {
      cols
        .get(collection)
        .into_iter()
        .flatten()
        .filter(|(_, fields)| match &query.filter {
          Some(f) => fields.get(&f.field) == Some(&f.value),
          None => true,
        })
        .map(|(id, fields)| Document {
          id:     id.clone(),
          fields: fields.clone(),
        })
        .collect()
    });

    if let Some(order) = &query.order_by {
      docs.retain(|d| d.fields.contains_key(&order.field));
      docs.sort_by(|a, b| {
        let ord = compare_values(&a.fields[&order.field], &b.fields[&order.field]);
        match order.direction {
          Direction::Ascending => ord,
          Direction::Descending => ord.reverse(),
        }
      });
    }

    if let Some(limit) = query.limit {
      docs.truncate(limit);
    }

    Ok(docs)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn fields(value: Value) -> Fields {
    match value {
      Value::Object(map) => map,
      other => panic!("not an object: {other}"),
    }
  }

  #[tokio::test]
  async fn replace_write_drops_old_fields() {
    let store = MemoryStore::new();
    store
      .set("c", "a", fields(json!({ "x": 1, "y": 2 })), false)
      .await
      .unwrap();
    store
      .set("c", "a", fields(json!({ "x": 3 })), false)
      .await
      .unwrap();

    let doc = store.get("c", "a").await.unwrap().unwrap();
    assert_eq!(Value::Object(doc.fields), json!({ "x": 3 }));
  }

  #[tokio::test]
  async fn merge_write_keeps_old_fields() {
    let store = MemoryStore::new();
    store
      .set("c", "a", fields(json!({ "x": 1, "y": 2 })), false)
      .await
      .unwrap();
    store
      .set("c", "a", fields(json!({ "x": 3 })), true)
      .await
      .unwrap();

    let doc = store.get("c", "a").await.unwrap().unwrap();
    assert_eq!(Value::Object(doc.fields), json!({ "x": 3, "y": 2 }));
  }

  #[tokio::test]
  async fn ordered_scan_skips_documents_without_the_field() {
    let store = MemoryStore::new();
    store.set("c", "a", fields(json!({ "n": 2 })), false).await.unwrap();
    store.set("c", "b", fields(json!({ "m": 1 })), false).await.unwrap();
    store.set("c", "c", fields(json!({ "n": 10 })), false).await.unwrap();

    let query = ScanQuery::all().order_by("n", Direction::Descending);
    let ids: Vec<String> = store
      .scan("c", &query)
      .await
      .unwrap()
      .into_iter()
      .map(|d| d.id)
      .collect();
    assert_eq!(ids, ["c", "a"]);
  }

  #[tokio::test]
  async fn scan_of_unknown_collection_is_empty() {
    let store = MemoryStore::new();
    assert!(store.scan("nope", &ScanQuery::all()).await.unwrap().is_empty());
    store.delete("nope", "x").await.unwrap();
  }
}
