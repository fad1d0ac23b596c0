//! Handlers shared by `/doctors`, `/patients` and `/exercises`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{resource}` | Every record |
//! | `POST`   | `/{resource}` | Body: create payload; returns 201 + record |
//! | `GET`    | `/{resource}/{id}` | 404 if not found |
//! | `PUT`    | `/{resource}/{id}` | Body: partial record, merged; 404 if not found |
//! | `DELETE` | `/{resource}/{id}` | 204; 404 if not found |
//!
//! Each handler is generic over the record type `R` and is mounted once per
//! resource by [`crate::api_router`].

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use rehab_core::{
  service::{Resource, ResourceService},
  store::DocumentStore,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{ApiError, ValidJson};

/// `GET /{resource}`
pub async fn list<S, R>(State(store): State<Arc<S>>) -> Result<Json<Vec<R>>, ApiError>
where
  S: DocumentStore,
  R: Resource + Serialize,
{
  let records = ResourceService::<S, R>::new(store).list_all().await?;
  Ok(Json(records))
}

/// `POST /{resource}`: returns 201 + the stored record.
pub async fn create<S, R>(
  State(store): State<Arc<S>>,
  ValidJson(body): ValidJson<R::Create>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  R: Resource + Serialize,
  R::Create: DeserializeOwned,
{
  let record = ResourceService::<S, R>::new(store).create(body).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /{resource}/{id}`
pub async fn get_one<S, R>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<R>, ApiError>
where
  S: DocumentStore,
  R: Resource + Serialize,
{
  let record = ResourceService::<S, R>::new(store).get_by_id(&id).await?;
  Ok(Json(record))
}

/// `PUT /{resource}/{id}`: merge the supplied fields into the stored record.
pub async fn update<S, R>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  ValidJson(body): ValidJson<R::Update>,
) -> Result<Json<R>, ApiError>
where
  S: DocumentStore,
  R: Resource + Serialize,
  R::Update: DeserializeOwned,
{
  let record = ResourceService::<S, R>::new(store).update(&id, body).await?;
  Ok(Json(record))
}

/// `DELETE /{resource}/{id}`
pub async fn delete<S, R>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore,
  R: Resource + Serialize,
{
  ResourceService::<S, R>::new(store).delete(&id).await?;
  Ok(StatusCode::NO_CONTENT)
}
