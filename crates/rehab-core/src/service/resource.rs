//! [`ResourceService`]: create, read, merge-update and delete for doctors,
//! patients and exercise presets.

use std::{marker::PhantomData, sync::Arc};

use crate::{
  Error, Result,
  service::{Resource, insert, to_fields},
  store::{Document, DocumentStore, ScanQuery},
};

pub struct ResourceService<S, R> {
  store:    Arc<S>,
  resource: PhantomData<fn() -> R>,
}

impl<S, R> Clone for ResourceService<S, R> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      resource: PhantomData,
    }
  }
}

impl<S, R> ResourceService<S, R>
where
  S: DocumentStore,
  R: Resource,
{
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      resource: PhantomData,
    }
  }

  /// Fetch the raw document at `id`, or fail with [`Error::NotFound`].
  async fn require(&self, id: &str) -> Result<Document> {
    self
      .store
      .get(R::COLLECTION, id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound {
        kind: R::KIND,
        id:   id.to_owned(),
      })
  }

  /// Store a new record under a store-assigned key and return it.
  pub async fn create(&self, payload: R::Create) -> Result<R> {
    R::check_create(&payload)?;
    let fields = to_fields(&payload)?;
    insert(self.store.as_ref(), R::COLLECTION, R::KIND, fields).await
  }

  /// Every record in the collection, in the store's default order.
  pub async fn list_all(&self) -> Result<Vec<R>> {
    self
      .store
      .scan(R::COLLECTION, &ScanQuery::all())
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(Document::into_record)
      .collect()
  }

  pub async fn get_by_id(&self, id: &str) -> Result<R> {
    self.require(id).await?.into_record()
  }

  /// Merge the fields present in `payload` into the stored record.
  ///
  /// Fields the payload omits keep their stored values, and the record's id
  /// never changes.
  pub async fn update(&self, id: &str, payload: R::Update) -> Result<R> {
    R::check_update(&payload)?;
    let mut fields = to_fields(&payload)?;
    fields.remove("id");

    self.require(id).await?;

    self
      .store
      .set(R::COLLECTION, id, fields, true)
      .await
      .map_err(Error::store)?;

    tracing::debug!(collection = R::COLLECTION, %id, "updated {}", R::KIND);
    self.get_by_id(id).await
  }

  /// Hard-delete the record at `id`.
  pub async fn delete(&self, id: &str) -> Result<()> {
    self.require(id).await?;

    self
      .store
      .delete(R::COLLECTION, id)
      .await
      .map_err(Error::store)?;

    tracing::debug!(collection = R::COLLECTION, %id, "deleted {}", R::KIND);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, sync::Arc};

  use crate::{
    Error,
    exercise::{ExercisePreset, ExercisePresetUpdate, JointAngles, NewExercisePreset},
    memory::MemoryStore,
    service::{DoctorService, ExercisePresetService, PatientService},
    store::{Document, DocumentStore, Fields, ScanQuery},
    user::{DoctorUpdate, Email, NewDoctor, NewPatient, PatientUpdate, Role},
  };

  fn email(s: &str) -> Email { Email::try_from(s).unwrap() }

  /// Accepts every write and never finds anything.
  struct LossyStore;

  impl DocumentStore for LossyStore {
    type Error = Infallible;

    async fn get(&self, _: &str, _: &str) -> Result<Option<Document>, Infallible> {
      Ok(None)
    }

    async fn set(&self, _: &str, _: &str, _: Fields, _: bool) -> Result<(), Infallible> {
      Ok(())
    }

    async fn delete(&self, _: &str, _: &str) -> Result<(), Infallible> { Ok(()) }

    async fn scan(&self, _: &str, _: &ScanQuery) -> Result<Vec<Document>, Infallible> {
      Ok(Vec::new())
    }
  }

  fn curls() -> NewExercisePreset {
    NewExercisePreset {
      name:           "Bicep Curls".into(),
      description:    "Perform bicep curls with dumbbells.".into(),
      duration:       30,
      benchmark_data: JointAngles {
        left_elbow:  vec![0.0, 45.0, 90.0],
        right_elbow: vec![0.0, 44.5, 89.0],
        left_knee:   vec![5.0],
        right_knee:  vec![5.5],
      },
    }
  }

  #[tokio::test]
  async fn create_then_get_round_trips() {
    let service = DoctorService::new(Arc::new(MemoryStore::new()));

    let created = service
      .create(NewDoctor::new("Dr. Evelyn Reed", email("e.reed@clinic.com")))
      .await
      .unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.role, Role::Doctor);

    let fetched = service.get_by_id(&created.id).await.unwrap();
    assert_eq!(fetched, created);
  }

  #[tokio::test]
  async fn create_stores_key_as_id_field() {
    let store = Arc::new(MemoryStore::new());
    let service = PatientService::new(Arc::clone(&store));

    let patient = service
      .create(NewPatient::new("John Doe", email("j.doe@email.com"), "doc1"))
      .await
      .unwrap();

    let raw = store.get("patients", &patient.id).await.unwrap().unwrap();
    assert_eq!(raw.fields["id"], patient.id.as_str());
    assert_eq!(raw.fields["doctorId"], "doc1");
    assert_eq!(raw.fields["role"], "patient");
  }

  #[tokio::test]
  async fn dangling_doctor_reference_is_accepted() {
    let service = PatientService::new(Arc::new(MemoryStore::new()));
    let patient = service
      .create(NewPatient::new("Jane Smith", email("j.smith@email.com"), "nobody"))
      .await
      .unwrap();
    assert_eq!(patient.doctor_id, "nobody");
  }

  #[tokio::test]
  async fn list_all_returns_every_record() {
    let service = ExercisePresetService::new(Arc::new(MemoryStore::new()));
    let a = service.create(curls()).await.unwrap();
    let mut squats = curls();
    squats.name = "Squats".into();
    let b = service.create(squats).await.unwrap();

    let mut ids: Vec<String> =
      service.list_all().await.unwrap().into_iter().map(|p| p.id).collect();
    ids.sort();
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(ids, expected);
  }

  #[tokio::test]
  async fn update_merges_only_supplied_fields() {
    let service = ExercisePresetService::new(Arc::new(MemoryStore::new()));
    let created = service.create(curls()).await.unwrap();

    let updated = service
      .update(&created.id, ExercisePresetUpdate {
        name: Some("X".into()),
        ..Default::default()
      })
      .await
      .unwrap();

    assert_eq!(updated, ExercisePreset {
      name: "X".into(),
      ..created.clone()
    });
    assert_eq!(service.get_by_id(&created.id).await.unwrap(), updated);
  }

  #[tokio::test]
  async fn update_ignores_id_in_payload() {
    let service = DoctorService::new(Arc::new(MemoryStore::new()));
    let created = service
      .create(NewDoctor::new("Dr. Samuel Chen", email("s.chen@clinic.com")))
      .await
      .unwrap();

    let payload: DoctorUpdate =
      serde_json::from_value(serde_json::json!({ "id": "other", "name": "Sam" }))
        .unwrap();
    let updated = service.update(&created.id, payload).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Sam");
    assert!(matches!(
      service.get_by_id("other").await,
      Err(Error::NotFound { .. })
    ));
  }

  #[tokio::test]
  async fn patient_cannot_become_doctor() {
    let service = PatientService::new(Arc::new(MemoryStore::new()));
    let created = service
      .create(NewPatient::new("Peter Jones", email("p.jones@email.com"), "doc2"))
      .await
      .unwrap();

    let err = service
      .update(&created.id, PatientUpdate {
        role: Some(Role::Doctor),
        ..Default::default()
      })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(service.get_by_id(&created.id).await.unwrap().role, Role::Patient);
  }

  #[tokio::test]
  async fn missing_id_is_not_found_everywhere() {
    let service = DoctorService::new(Arc::new(MemoryStore::new()));

    let get = service.get_by_id("missing").await.unwrap_err();
    let update = service
      .update("missing", DoctorUpdate::default())
      .await
      .unwrap_err();
    let delete = service.delete("missing").await.unwrap_err();

    for err in [get, update, delete] {
      assert!(
        matches!(&err, Error::NotFound { kind: "doctor", id } if id == "missing"),
        "{err:?}"
      );
    }
  }

  #[tokio::test]
  async fn update_of_missing_record_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let service = DoctorService::new(Arc::clone(&store));

    service
      .update("ghost", DoctorUpdate {
        name: Some("Nobody".into()),
        ..Default::default()
      })
      .await
      .unwrap_err();

    assert!(store.get("doctors", "ghost").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn delete_removes_record() {
    let service = DoctorService::new(Arc::new(MemoryStore::new()));
    let created = service
      .create(NewDoctor::new("Dr. Evelyn Reed", email("e.reed@clinic.com")))
      .await
      .unwrap();

    service.delete(&created.id).await.unwrap();
    assert!(service.get_by_id(&created.id).await.unwrap_err().is_not_found());
    assert!(service.list_all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn create_without_read_back_is_not_persisted() {
    let service = DoctorService::new(Arc::new(LossyStore));

    let err = service
      .create(NewDoctor::new("Dr. Evelyn Reed", email("e.reed@clinic.com")))
      .await
      .unwrap_err();
    assert!(
      matches!(&err, Error::NotPersisted { kind: "doctor", id } if !id.is_empty()),
      "{err:?}"
    );
  }
}
