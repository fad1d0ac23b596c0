//! Collection reset. Empties a collection ahead of reseeding.
//!
//! This is a maintenance operation. Writes that land while a reset is running
//! may survive it or be picked up by a later batch; nothing guards against
//! that.

use crate::{
  Error, Result,
  store::{DocumentStore, ScanQuery},
};

/// Batch size used by the seeding command.
pub const DEFAULT_RESET_BATCH: usize = 50;

/// Delete every document in `collection`, `batch_size` at a time.
///
/// Each pass scans at most `batch_size` documents and deletes them one by
/// one; a pass that comes back short means the collection is empty. Returns
/// the number of documents deleted.
pub async fn reset_collection<S>(
  store: &S,
  collection: &str,
  batch_size: usize,
) -> Result<usize>
where
  S: DocumentStore,
{
  if batch_size == 0 {
    return Err(Error::InvalidBatchSize);
  }

  let query = ScanQuery::all().limit(batch_size);
  let mut deleted = 0;

  loop {
    let batch = store
      .scan(collection, &query)
      .await
      .map_err(Error::store)?;
    let scanned = batch.len();

    for doc in batch {
      tracing::debug!(collection, id = %doc.id, "deleting document");
      store
        .delete(collection, &doc.id)
        .await
        .map_err(Error::store)?;
    }
    deleted += scanned;

    if scanned < batch_size {
      break;
    }
  }

  tracing::info!(collection, deleted, "collection reset");
  Ok(deleted)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{memory::MemoryStore, store::Fields};

  async fn fill(store: &MemoryStore, collection: &str, count: usize) {
    for i in 0..count {
      let mut fields = Fields::new();
      fields.insert("n".into(), json!(i));
      store
        .set(collection, &format!("doc{i:04}"), fields, false)
        .await
        .unwrap();
    }
  }

  #[tokio::test]
  async fn empties_collections_below_and_above_batch_size() {
    for count in [0, 10, 50, 120] {
      let store = MemoryStore::new();
      fill(&store, "doctors", count).await;

      let deleted = reset_collection(&store, "doctors", DEFAULT_RESET_BATCH)
        .await
        .unwrap();

      assert_eq!(deleted, count);
      assert!(
        store.scan("doctors", &ScanQuery::all()).await.unwrap().is_empty(),
        "{count} documents"
      );
    }
  }

  #[tokio::test]
  async fn leaves_other_collections_alone() {
    let store = MemoryStore::new();
    fill(&store, "sessions", 3).await;
    fill(&store, "patients", 2).await;

    reset_collection(&store, "sessions", 2).await.unwrap();

    assert_eq!(store.scan("patients", &ScanQuery::all()).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn zero_batch_size_is_rejected() {
    let store = MemoryStore::new();
    let err = reset_collection(&store, "doctors", 0).await.unwrap_err();
    assert!(matches!(err, Error::InvalidBatchSize));
  }
}
