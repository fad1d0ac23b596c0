//! CRUD services over a [`DocumentStore`].
//!
//! Every service is constructed with an explicit store handle; there is no
//! process-wide connection. Existence checks and the mutations they guard are
//! separate store round trips and are not atomic as a pair.

pub mod reset;
pub mod resource;
pub mod session;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
  Error, Result,
  exercise::ExercisePreset,
  store::{DocumentStore, Fields},
  user::{Doctor, Patient},
};

pub use reset::{DEFAULT_RESET_BATCH, reset_collection};
pub use resource::ResourceService;
pub use session::SessionService;

pub type DoctorService<S> = ResourceService<S, Doctor>;
pub type PatientService<S> = ResourceService<S, Patient>;
pub type ExercisePresetService<S> = ResourceService<S, ExercisePreset>;

/// A record type managed by [`ResourceService`]: where it lives and what its
/// create and update payloads look like.
pub trait Resource: DeserializeOwned + Send + 'static {
  type Create: Serialize + Send + Sync;
  type Update: Serialize + Send + Sync;

  /// Name of the backing collection.
  const COLLECTION: &'static str;
  /// Human-readable name used in error messages.
  const KIND: &'static str;

  /// Reject a create payload before anything is written.
  fn check_create(_payload: &Self::Create) -> Result<()> { Ok(()) }

  /// Reject an update payload before anything is written.
  fn check_update(_payload: &Self::Update) -> Result<()> { Ok(()) }
}

/// Serialise a payload into the field map that gets written.
pub(crate) fn to_fields<T: Serialize>(payload: &T) -> Result<Fields> {
  match serde_json::to_value(payload)? {
    Value::Object(fields) => Ok(fields),
    other => Err(Error::Validation(format!(
      "payload must be a JSON object, got {other}"
    ))),
  }
}

/// Write `fields` under a freshly allocated key, then read the document back.
///
/// The stored document carries its own key as `id`. A missing read-back means
/// the store lost the write and is reported as [`Error::NotPersisted`].
pub(crate) async fn insert<S, T>(
  store: &S,
  collection: &'static str,
  kind: &'static str,
  mut fields: Fields,
) -> Result<T>
where
  S: DocumentStore,
  T: DeserializeOwned,
{
  let id = store.new_key(collection);
  fields.insert("id".to_owned(), Value::String(id.clone()));

  store
    .set(collection, &id, fields, false)
    .await
    .map_err(Error::store)?;

  let created = store
    .get(collection, &id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotPersisted { kind, id: id.clone() })?;

  tracing::debug!(collection, %id, "created {kind}");
  created.into_record()
}
