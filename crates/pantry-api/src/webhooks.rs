//! Handlers for `/webhooks` endpoints. Admin only.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/webhooks` | Newest first |
//! | `POST`   | `/webhooks` | Body: [`NewWebhookBody`]; 201 |
//! | `PATCH`  | `/webhooks/{id}` | Body: `{"active": bool}` |
//! | `DELETE` | `/webhooks/{id}` | 204 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use pantry_core::{
  store::PantryStore,
  webhook::{NewWebhookConfig, WebhookConfig},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AdminUser, AppState, Backend, error::ApiError, extract::{Json, Path}};

/// `GET /webhooks`
pub async fn list<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
) -> Result<Json<Vec<WebhookConfig>>, ApiError> {
  let hooks = state.store.list_webhooks().await.map_err(ApiError::backend)?;
  Ok(Json(hooks))
}

fn default_active() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct NewWebhookBody {
  /// One of the configured event names.
  pub event_type: String,
  pub url:        String,
  #[serde(default = "default_active")]
  pub active:     bool,
}

/// `POST /webhooks`
pub async fn create<B: Backend>(
  State(state): State<AppState<B>>,
  AdminUser(admin): AdminUser,
  Json(body): Json<NewWebhookBody>,
) -> Result<impl IntoResponse, ApiError> {
  let names = state.dispatcher.event_names();
  if names.parse(&body.event_type).is_none() {
    return Err(ApiError::BadRequest(format!(
      "unknown event type {:?}; expected {:?} or {:?}",
      body.event_type, names.received, names.delivered
    )));
  }

  let input = NewWebhookConfig {
    event_type: body.event_type,
    url:        body.url.trim().to_owned(),
    active:     body.active,
    created_by: admin.profile.id,
  };
  let hook = state.store.create_webhook(input).await.map_err(ApiError::backend)?;
  Ok((StatusCode::CREATED, Json(hook)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateWebhookBody {
  pub active: bool,
}

/// `PATCH /webhooks/{id}`
pub async fn update<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateWebhookBody>,
) -> Result<Json<WebhookConfig>, ApiError> {
  let hook = state
    .store
    .set_webhook_active(id, body.active)
    .await
    .map_err(ApiError::backend)?;
  Ok(Json(hook))
}

/// `DELETE /webhooks/{id}`
pub async fn remove<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.store.delete_webhook(id).await.map_err(ApiError::backend)?;
  Ok(StatusCode::NO_CONTENT)
}
