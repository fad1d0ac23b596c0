//! Error types for `rehab-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} with id '{id}' not found")]
  NotFound { kind: &'static str, id: String },

  /// The write was acknowledged but the confirming read found nothing.
  #[error("failed to create {kind}: document '{id}' missing after write")]
  NotPersisted { kind: &'static str, id: String },

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("reset batch size must be at least 1")]
  InvalidBatchSize,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
