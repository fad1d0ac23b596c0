//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use rehab_core::store::{Direction, Document, DocumentStore, Fields, ScanQuery};
use rusqlite::{OptionalExtension as _, types::Value as SqlValue};

use crate::{
  Result,
  encode::{RawDocument, encode_fields, encode_filter_value, json_path, merge_encoded},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Build the `SELECT` for a scan together with its positional parameters.
fn scan_sql(collection: &str, query: &ScanQuery) -> (String, Vec<SqlValue>) {
  let mut sql =
    String::from("SELECT doc_id, data FROM documents WHERE collection = ?");
  let mut params = vec![SqlValue::Text(collection.to_owned())];

  if let Some(filter) = &query.filter {
    sql.push_str(" AND json_extract(data, ?) = ?");
    params.push(SqlValue::Text(json_path(&filter.field)));
    params.push(encode_filter_value(&filter.value));
  }

  match &query.order_by {
    Some(order) => {
      let dir = match order.direction {
        Direction::Ascending => "ASC",
        Direction::Descending => "DESC",
      };
      // `json_type` is NULL only when the field is absent.
      sql.push_str(&format!(
        " AND json_type(data, ?) IS NOT NULL ORDER BY json_extract(data, ?) {dir}, doc_id"
      ));
      let path = json_path(&order.field);
      params.push(SqlValue::Text(path.clone()));
      params.push(SqlValue::Text(path));
    }
    None => sql.push_str(" ORDER BY doc_id"),
  }

  if let Some(limit) = query.limit {
    sql.push_str(" LIMIT ?");
    params.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
  }

  (sql, params)
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
    let collection_str = collection.to_owned();
    let id_str = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT doc_id, data FROM documents WHERE collection = ?1 AND doc_id = ?2",
              rusqlite::params![collection_str, id_str],
              |row| {
                Ok(RawDocument {
                  doc_id: row.get(0)?,
                  data:   row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_document(collection)).transpose()
  }

  async fn set(
    &self,
    collection: &str,
    id: &str,
    fields: Fields,
    merge: bool,
  ) -> Result<()> {
    let collection_str = collection.to_owned();
    let id_str = id.to_owned();
    let replacement = encode_fields(&fields)?;

    // Read-modify-write inside one transaction so a merge sees a stable body.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let stored: Option<String> = if merge {
          tx.query_row(
            "SELECT data FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection_str, id_str],
            |row| row.get(0),
          )
          .optional()?
        } else {
          None
        };

        let body = match stored {
          Some(stored) => merge_encoded(&stored, fields)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?,
          None => replacement,
        };

        tx.execute(
          "INSERT INTO documents (collection, doc_id, data) VALUES (?1, ?2, ?3)
           ON CONFLICT (collection, doc_id) DO UPDATE SET data = excluded.data",
          rusqlite::params![collection_str, id_str, body],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<()> {
    let collection_str = collection.to_owned();
    let id_str = id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn scan(&self, collection: &str, query: &ScanQuery) -> Result<Vec<Document>> {
    let (sql, params) = scan_sql(collection, query);

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawDocument {
              doc_id: row.get(0)?,
              data:   row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_document(collection)).collect()
  }
}
