//! JSON REST API for the rehab record service.
//!
//! Exposes an axum [`Router`] backed by any [`rehab_core::store::DocumentStore`].
//! CORS, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rehab_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod resources;
pub mod sessions;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use rehab_core::{
  exercise::ExercisePreset,
  store::DocumentStore,
  user::{Doctor, Patient},
};
use serde_json::{Value, json};

pub use error::{ApiError, ValidJson};

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    // Doctors
    .route(
      "/doctors",
      get(resources::list::<S, Doctor>).post(resources::create::<S, Doctor>),
    )
    .route(
      "/doctors/{id}",
      get(resources::get_one::<S, Doctor>)
        .put(resources::update::<S, Doctor>)
        .delete(resources::delete::<S, Doctor>),
    )
    // Patients
    .route(
      "/patients",
      get(resources::list::<S, Patient>).post(resources::create::<S, Patient>),
    )
    .route(
      "/patients/{id}",
      get(resources::get_one::<S, Patient>)
        .put(resources::update::<S, Patient>)
        .delete(resources::delete::<S, Patient>),
    )
    // Exercise presets
    .route(
      "/exercises",
      get(resources::list::<S, ExercisePreset>)
        .post(resources::create::<S, ExercisePreset>),
    )
    .route(
      "/exercises/{id}",
      get(resources::get_one::<S, ExercisePreset>)
        .put(resources::update::<S, ExercisePreset>)
        .delete(resources::delete::<S, ExercisePreset>),
    )
    // Sessions
    .route(
      "/sessions/patients/{patient_id}/sessions",
      get(sessions::list_for_patient::<S>),
    )
    .route("/sessions/sessions", post(sessions::create::<S>))
    .route("/health", get(health))
    .with_state(store)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
