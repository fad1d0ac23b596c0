//! Handlers for `/sessions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sessions/patients/{patient_id}/sessions` | Newest first |
//! | `POST` | `/sessions/sessions` | Body: [`NewSession`]; returns 201 + stored session |
//!
//! Sessions have no update or delete route.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rehab_core::{
  service::SessionService,
  session::{NewSession, Session},
  store::DocumentStore,
};

use crate::error::{ApiError, ValidJson};

/// `GET /sessions/patients/{patient_id}/sessions`
pub async fn list_for_patient<S>(
  State(store): State<Arc<S>>,
  Path(patient_id): Path<String>,
) -> Result<Json<Vec<Session>>, ApiError>
where
  S: DocumentStore,
{
  let sessions = SessionService::new(store)
    .list_for_patient(&patient_id)
    .await?;
  Ok(Json(sessions))
}

/// `POST /sessions/sessions`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  ValidJson(body): ValidJson<NewSession>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let session = SessionService::new(store).create(body).await?;
  Ok((StatusCode::CREATED, Json(session)))
}
