//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use pantry_core::{Classify, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a store, auth or storage error onto the matching response.
  pub fn backend<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match e.kind() {
      ErrorKind::NotFound => ApiError::NotFound(e.to_string()),
      ErrorKind::Invalid => ApiError::BadRequest(e.to_string()),
      ErrorKind::Conflict => ApiError::Conflict(e.to_string()),
      ErrorKind::Unauthorized => ApiError::Unauthorized(e.to_string()),
      ErrorKind::Internal => ApiError::Backend(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::NotFound(m)
      | ApiError::BadRequest(m)
      | ApiError::Unauthorized(m)
      | ApiError::Forbidden(m)
      | ApiError::Conflict(m) => m.clone(),
      ApiError::Backend(e) => {
        tracing::error!(error = %e, "request failed");
        "internal server error".to_owned()
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

// ─── Extractor rejections ────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classified_errors_pick_their_status() {
    let invalid = ApiError::backend(pantry_core::Error::EmptyMovement);
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let internal = ApiError::backend(pantry_core::Error::Serialization(
      serde_json::from_str::<u8>("x").unwrap_err(),
    ));
    assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
