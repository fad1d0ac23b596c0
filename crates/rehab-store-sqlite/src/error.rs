//! Error type for `rehab-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored body decoded to something other than a JSON object.
  #[error("document {collection}/{id} is not a JSON object")]
  NotAnObject { collection: String, id: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
