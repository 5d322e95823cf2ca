//! Handlers for `/movements` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/movements` | Optional `beneficiary_id` |
//! | `POST`   | `/movements` | Body: [`NewMovementBody`]; 201; fires `DonationDelivered` |
//! | `DELETE` | `/movements/{id}` | Admin; restores stock; 204 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use pantry_core::{
  movement::{MovementView, NewMovement, NewMovementLine},
  store::{MovementFilter, PantryStore},
  webhook::WebhookEvent,
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
  pub beneficiary_id: Option<Uuid>,
}

/// `GET /movements`
pub async fn list<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<MovementView>>, ApiError> {
  let filter = MovementFilter { beneficiary_id: params.beneficiary_id };
  let movements = state.store.list_movements(&filter).await.map_err(ApiError::backend)?;
  Ok(Json(movements))
}

/// JSON body accepted by `POST /movements`. The deliverer is the caller.
#[derive(Debug, Deserialize)]
pub struct NewMovementBody {
  pub beneficiary_id:     Uuid,
  pub items:              Vec<NewMovementLine>,
  /// Defaults to now.
  pub delivered_at:       Option<DateTime<Utc>>,
  pub evidence_photo_url: Option<String>,
}

/// `POST /movements`
pub async fn create<B: Backend>(
  State(state): State<AppState<B>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewMovementBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewMovement {
    beneficiary_id:     body.beneficiary_id,
    items:              body.items,
    delivered_at:       body.delivered_at.unwrap_or_else(Utc::now),
    evidence_photo_url: body.evidence_photo_url,
    delivered_by:       user.profile.id,
  };
  let movement = state.store.create_movement(input).await.map_err(ApiError::backend)?;

  state.dispatcher.dispatch(WebhookEvent::DonationDelivered, &movement);
  Ok((StatusCode::CREATED, Json(movement)))
}

/// `DELETE /movements/{id}`
pub async fn remove<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.store.delete_movement(id).await.map_err(ApiError::backend)?;
  Ok(StatusCode::NO_CONTENT)
}
