//! `POST /uploads?folder=&filename=`: store the raw request body.

use axum::{
  body::Bytes,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use pantry_core::storage::{DEFAULT_FOLDER, FileStorage};
use serde::Deserialize;

use crate::{AppState, Backend, CurrentUser, error::ApiError, extract::{Json, Query}};

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  /// Defaults to `evidence`.
  pub folder:   Option<String>,
  /// Only its extension is kept.
  pub filename: Option<String>,
}

/// Returns 201 + [`StoredObject`](pantry_core::storage::StoredObject).
pub async fn upload<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Query(params): Query<UploadParams>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
  if body.is_empty() {
    return Err(ApiError::BadRequest("empty upload".into()));
  }
  let folder = params.folder.as_deref().unwrap_or(DEFAULT_FOLDER);
  let filename = params.filename.as_deref().unwrap_or_default();

  let stored = state
    .files
    .upload(folder, filename, body.to_vec())
    .await
    .map_err(ApiError::backend)?;
  Ok((StatusCode::CREATED, Json(stored)))
}
