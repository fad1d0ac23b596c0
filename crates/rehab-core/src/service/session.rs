//! [`SessionService`]: append-only access to recorded sessions.

use std::sync::Arc;

use crate::{
  Error, Result,
  service::{insert, to_fields},
  session::{NewSession, Session},
  store::{Direction, Document, DocumentStore, ScanQuery},
};

pub const SESSIONS: &str = "sessions";

/// Sessions can be recorded and listed, never updated or deleted. Only
/// [`crate::service::reset_collection`] removes them.
pub struct SessionService<S> {
  store: Arc<S>,
}

impl<S> Clone for SessionService<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

impl<S: DocumentStore> SessionService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// All sessions for `patient_id`, most recent `date` first. Ties come back
  /// in no particular order.
  pub async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<Session>> {
    let query = ScanQuery::all()
      .where_eq("patientId", patient_id)
      .order_by("date", Direction::Descending);

    self
      .store
      .scan(SESSIONS, &query)
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(Document::into_record)
      .collect()
  }

  pub async fn create(&self, payload: NewSession) -> Result<Session> {
    let fields = to_fields(&payload)?;
    insert(self.store.as_ref(), SESSIONS, "session", fields).await
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::{exercise::JointAngles, memory::MemoryStore};

  fn session(patient: &str, date: &str) -> NewSession {
    NewSession::new(patient, "doc1", date, JointAngles {
      left_elbow:  vec![12.0, 48.25, 87.5],
      right_elbow: vec![10.0, 50.0],
      left_knee:   vec![],
      right_knee:  vec![120.0],
    })
  }

  #[tokio::test]
  async fn create_returns_stored_session() {
    let service = SessionService::new(Arc::new(MemoryStore::new()));
    let mut input = session("pat1", "2024-01-01T09:30:00");
    input.exercise_preset_id = Some("ex1".into());

    let created = service.create(input.clone()).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.patient_id, "pat1");
    assert_eq!(created.angles, input.angles);
    assert_eq!(created.exercise_preset_id.as_deref(), Some("ex1"));
  }

  #[tokio::test]
  async fn lists_newest_first() {
    let service = SessionService::new(Arc::new(MemoryStore::new()));
    for date in ["2024-01-03", "2024-01-01", "2024-01-02"] {
      service.create(session("pat1", date)).await.unwrap();
    }

    let dates: Vec<String> = service
      .list_for_patient("pat1")
      .await
      .unwrap()
      .into_iter()
      .map(|s| s.date)
      .collect();
    assert_eq!(dates, ["2024-01-03", "2024-01-02", "2024-01-01"]);
  }

  #[tokio::test]
  async fn only_the_requested_patient_is_listed() {
    let service = SessionService::new(Arc::new(MemoryStore::new()));
    service.create(session("pat1", "2024-01-01")).await.unwrap();
    service.create(session("pat2", "2024-01-02")).await.unwrap();

    let listed = service.list_for_patient("pat1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].patient_id, "pat1");

    assert!(service.list_for_patient("nobody").await.unwrap().is_empty());
  }
}
