//! Handlers for `/inventory` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/inventory` | Optional `category`, `search` |
//! | `POST`   | `/inventory` | Body: [`NewItemBody`]; 201; fires `DonationReceived` |
//! | `GET`    | `/inventory/available` | Quantity > 0, by name |
//! | `GET`    | `/inventory/{id}` | |
//! | `PATCH`  | `/inventory/{id}` | Admin; body: [`InventoryPatch`] |
//! | `DELETE` | `/inventory/{id}` | Admin; 204 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use pantry_core::{
  inventory::{InventoryItem, InventoryPatch, ItemCategory, NewInventoryItem},
  store::{InventoryFilter, PantryStore},
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
  pub category: Option<ItemCategory>,
  pub search:   Option<String>,
}

/// `GET /inventory`
pub async fn list<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
  let filter = InventoryFilter { category: params.category, search: params.search };
  let items = state.store.list_items(&filter).await.map_err(ApiError::backend)?;
  Ok(Json(items))
}

/// `GET /inventory/available`
pub async fn available<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
  let items = state.store.available_stock().await.map_err(ApiError::backend)?;
  Ok(Json(items))
}

/// `GET /inventory/{id}`
pub async fn get_one<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, ApiError> {
  let item = state
    .store
    .get_item(id)
    .await
    .map_err(ApiError::backend)?
    .ok_or_else(|| ApiError::NotFound(format!("inventory item {id} not found")))?;
  Ok(Json(item))
}

/// JSON body accepted by `POST /inventory`. The registering user is taken
/// from the session.
#[derive(Debug, Deserialize)]
pub struct NewItemBody {
  pub item_name:     String,
  pub category:      ItemCategory,
  pub quantity:      u32,
  pub donor_name:    Option<String>,
  /// Defaults to today (UTC).
  pub received_date: Option<NaiveDate>,
  pub expiry_date:   Option<NaiveDate>,
  pub photo_url:     Option<String>,
}

/// `POST /inventory`
pub async fn create<B: Backend>(
  State(state): State<AppState<B>>,
  CurrentUser(user): CurrentUser,
  Json(body): Json<NewItemBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.item_name.trim().is_empty() {
    return Err(ApiError::BadRequest("item_name must not be empty".into()));
  }

  let input = NewInventoryItem {
    item_name:     body.item_name.trim().to_owned(),
    category:      body.category,
    quantity:      body.quantity,
    donor_name:    body.donor_name,
    received_date: body.received_date.unwrap_or_else(|| Utc::now().date_naive()),
    expiry_date:   body.expiry_date,
    photo_url:     body.photo_url,
    created_by:    user.profile.id,
  };
  let item = state.store.create_item(input).await.map_err(ApiError::backend)?;

  state.dispatcher.dispatch(WebhookEvent::DonationReceived, &item);
  Ok((StatusCode::CREATED, Json(item)))
}

/// `PATCH /inventory/{id}`
pub async fn update<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
  Json(patch): Json<InventoryPatch>,
) -> Result<Json<InventoryItem>, ApiError> {
  let item = state.store.update_item(id, patch).await.map_err(ApiError::backend)?;
  Ok(Json(item))
}

/// `DELETE /inventory/{id}`
pub async fn remove<B: Backend>(
  State(state): State<AppState<B>>,
  _admin: AdminUser,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.store.delete_item(id).await.map_err(ApiError::backend)?;
  Ok(StatusCode::NO_CONTENT)
}
