//! User management. Admin only.

use axum::extract::State;
use pantry_core::{
  profile::{Profile, Role},
  store::PantryStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AdminUser, AppState, Backend, error::ApiError, extract::{Json, Path}};

/// `GET /users`
pub async fn list<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
) -> Result<Json<Vec<Profile>>, ApiError> {
  let profiles = state.store.list_profiles().await.map_err(ApiError::backend)?;
  Ok(Json(profiles))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `PATCH /users/{id}/role`
///
/// An admin cannot demote themselves.
pub async fn set_role<B: Backend>(
  State(state): State<AppState<B>>,
  AdminUser(admin): AdminUser,
  Path(id): Path<Uuid>,
  Json(body): Json<RoleBody>,
) -> Result<Json<Profile>, ApiError> {
  if id == admin.profile.id && body.role != Role::Admin {
    return Err(ApiError::BadRequest("administrators cannot demote themselves".into()));
  }

  let profile = state.store.set_role(id, body.role).await.map_err(ApiError::backend)?;
  state.sessions.update_profile(&profile);
  tracing::info!(user = %profile.id, role = %profile.role, by = %admin.profile.id, "role changed");
  Ok(Json(profile))
}
