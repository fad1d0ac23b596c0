//! The `DocumentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `rehab-store-sqlite`,
//! or [`crate::memory::MemoryStore`] in tests). The services in
//! [`crate::service`] depend on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::Result;

/// The body of a stored document: a JSON object keyed by field name.
pub type Fields = serde_json::Map<String, Value>;

// ─── Document ────────────────────────────────────────────────────────────────

/// A raw document as returned by a store: its key and its stored fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id:     String,
  pub fields: Fields,
}

impl Document {
  /// Decode into a typed record.
  ///
  /// The document key is written over any stored `id` field, so a record's
  /// identity always comes from where it is stored.
  pub fn into_record<T: DeserializeOwned>(self) -> Result<T> {
    let mut fields = self.fields;
    fields.insert("id".to_owned(), Value::String(self.id));
    Ok(serde_json::from_value(Value::Object(fields))?)
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
  #[default]
  Ascending,
  Descending,
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
  pub field: String,
  pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
  pub field:     String,
  pub direction: Direction,
}

/// Parameters for [`DocumentStore::scan`].
///
/// With no `order_by`, documents come back in the store's default order.
/// With an `order_by`, documents that lack the ordering field are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanQuery {
  pub filter:   Option<FieldFilter>,
  pub order_by: Option<OrderBy>,
  pub limit:    Option<usize>,
}

impl ScanQuery {
  /// Every document in the collection.
  pub fn all() -> Self { Self::default() }

  pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
    self.filter = Some(FieldFilter {
      field: field.to_owned(),
      value: value.into(),
    });
    self
  }

  pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
    self.order_by = Some(OrderBy {
      field: field.to_owned(),
      direction,
    });
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Apply a merge write of `patch` onto `target`.
///
/// Nested objects are merged key by key; any other value (including arrays)
/// replaces what was stored.
pub fn merge_fields(target: &mut Fields, patch: Fields) {
  for (key, value) in patch {
    match (target.get_mut(&key), value) {
      (Some(Value::Object(existing)), Value::Object(incoming)) => {
        merge_fields(existing, incoming);
      }
      (_, value) => {
        target.insert(key, value);
      }
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document database: named collections of schemaless
/// JSON documents addressed by string keys.
///
/// Each individual operation is atomic; nothing spans more than one document.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Allocate a fresh document key in `collection`. Nothing is written.
  fn new_key(&self, _collection: &str) -> String {
    Uuid::new_v4().simple().to_string()
  }

  /// Fetch a document. Returns `None` if there is nothing at `id`.
  fn get<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Write `fields` at `id`.
  ///
  /// With `merge == false` the stored document is replaced wholesale; with
  /// `merge == true` the fields are merged into it (see [`merge_fields`]).
  /// Either way the document is created if it does not exist.
  fn set<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
    fields: Fields,
    merge: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove the document at `id`. Deleting a missing document is not an
  /// error.
  fn delete<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Return the documents in `collection` matching `query`.
  fn scan<'a>(
    &'a self,
    collection: &'a str,
    query: &'a ScanQuery,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;
}
