//! API error type, [`axum::response::IntoResponse`] implementation, and the
//! [`ValidJson`] body extractor.

use axum::{
  Json,
  extract::{FromRequest, Request, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  /// Details are logged, never sent to the client.
  #[error("internal error: {0}")]
  Internal(#[source] rehab_core::Error),
}

impl From<rehab_core::Error> for ApiError {
  fn from(e: rehab_core::Error) -> Self {
    match e {
      rehab_core::Error::NotFound { .. } => ApiError::NotFound(e.to_string()),
      rehab_core::Error::Validation(msg) => ApiError::Unprocessable(msg),
      other => ApiError::Internal(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_owned(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

/// [`Json`] that reports every body problem (bad syntax, wrong shape, an
/// invalid email, ...) as `422` in the API's error format.
///
/// The body must be a JSON object. serde would otherwise accept an array as
/// the positional form of a struct.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<Value>::from_request(req, state)
      .await
      .map_err(|rejection: JsonRejection| {
        ApiError::Unprocessable(rejection.body_text())
      })?;

    if !value.is_object() {
      return Err(ApiError::Unprocessable(
        "request body must be a JSON object".to_owned(),
      ));
    }

    serde_json::from_value(value)
      .map(Self)
      .map_err(|e| ApiError::Unprocessable(e.to_string()))
  }
}
