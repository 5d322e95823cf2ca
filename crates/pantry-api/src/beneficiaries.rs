//! Handlers for `/beneficiaries` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/beneficiaries` | Optional `kind`, `search`, `active` |
//! | `POST`   | `/beneficiaries` | Body: [`NewBeneficiary`]; 201 |
//! | `GET`    | `/beneficiaries/active` | |
//! | `GET`    | `/beneficiaries/{id}` | |
//! | `PATCH`  | `/beneficiaries/{id}` | Admin; body: [`BeneficiaryPatch`] |
//! | `DELETE` | `/beneficiaries/{id}` | Admin; 204, 409 if deliveries reference it |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use pantry_core::{
  beneficiary::{Beneficiary, BeneficiaryKind, BeneficiaryPatch, NewBeneficiary},
  store::{BeneficiaryFilter, PantryStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AdminUser,
  AppState,
  Backend,
  CurrentUser,
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind:   Option<BeneficiaryKind>,
  pub search: Option<String>,
  pub active: Option<bool>,
}

/// `GET /beneficiaries`
pub async fn list<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Beneficiary>>, ApiError> {
  let filter = BeneficiaryFilter {
    kind:   params.kind,
    search: params.search,
    active: params.active,
  };
  let found = state
    .store
    .list_beneficiaries(&filter)
    .await
    .map_err(ApiError::backend)?;
  Ok(Json(found))
}

/// `GET /beneficiaries/active`
pub async fn active<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
) -> Result<Json<Vec<Beneficiary>>, ApiError> {
  let found = state.store.active_beneficiaries().await.map_err(ApiError::backend)?;
  Ok(Json(found))
}

/// `GET /beneficiaries/{id}`
pub async fn get_one<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<Beneficiary>, ApiError> {
  let beneficiary = state
    .store
    .get_beneficiary(id)
    .await
    .map_err(ApiError::backend)?
    .ok_or_else(|| ApiError::NotFound(format!("beneficiary {id} not found")))?;
  Ok(Json(beneficiary))
}

/// `POST /beneficiaries`
pub async fn create<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Json(body): Json<NewBeneficiary>,
) -> Result<impl IntoResponse, ApiError> {
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let beneficiary = state
    .store
    .create_beneficiary(body)
    .await
    .map_err(ApiError::backend)?;
  Ok((StatusCode::CREATED, Json(beneficiary)))
}

/// `PATCH /beneficiaries/{id}`
pub async fn update<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<BeneficiaryPatch>,
) -> Result<Json<Beneficiary>, ApiError> {
  let beneficiary = state
    .store
    .update_beneficiary(id, patch)
    .await
    .map_err(ApiError::backend)?;
  Ok(Json(beneficiary))
}

/// `DELETE /beneficiaries/{id}`
pub async fn remove<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.store.delete_beneficiary(id).await.map_err(ApiError::backend)?;
  Ok(StatusCode::NO_CONTENT)
}
