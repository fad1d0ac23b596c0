//! Encoding and decoding helpers between documents and the plain-text
//! representations stored in SQLite columns.
//!
//! Document bodies are compact JSON objects. Field lookups inside a body go
//! through SQLite's JSON functions with a quoted path (`$."field"`).

use rehab_core::store::{Document, Fields, merge_fields};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::{Error, Result};

/// A `documents` row as read from SQLite.
pub struct RawDocument {
  pub doc_id: String,
  pub data:   String,
}

impl RawDocument {
  pub fn into_document(self, collection: &str) -> Result<Document> {
    match serde_json::from_str(&self.data)? {
      Value::Object(fields) => Ok(Document {
        id: self.doc_id,
        fields,
      }),
      _ => Err(Error::NotAnObject {
        collection: collection.to_owned(),
        id:         self.doc_id,
      }),
    }
  }
}

// ─── Bodies ──────────────────────────────────────────────────────────────────

pub fn encode_fields(fields: &Fields) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

/// Merge `patch` into a stored body and re-encode it.
pub fn merge_encoded(stored: &str, patch: Fields) -> serde_json::Result<String> {
  let mut current: Fields = serde_json::from_str(stored)?;
  merge_fields(&mut current, patch);
  serde_json::to_string(&current)
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// JSON path selecting a top-level field.
pub fn json_path(field: &str) -> String {
  format!("$.\"{}\"", field.replace('"', "\\\""))
}

/// The SQL value `json_extract` yields for `value`, so filters can compare
/// with `=`.
pub fn encode_filter_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    // `json_extract` returns nested values as minified JSON text.
    Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
  }
}
