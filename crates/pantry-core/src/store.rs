//! The `PantryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `pantry-store-sqlite`).
//! Higher layers (`pantry-api`, `pantry-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  beneficiary::{Beneficiary, BeneficiaryKind, BeneficiaryPatch, NewBeneficiary},
  inventory::{InventoryItem, InventoryPatch, ItemCategory, NewInventoryItem},
  movement::{DonationMovement, MovementView, NewMovement},
  profile::{Profile, Role},
  webhook::{NewWebhookConfig, WebhookConfig, WebhookSource},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`PantryStore::list_items`].
#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
  pub category: Option<ItemCategory>,
  /// Case-insensitive substring of the item name.
  pub search:   Option<String>,
}

/// Parameters for [`PantryStore::list_beneficiaries`].
#[derive(Debug, Clone, Default)]
pub struct BeneficiaryFilter {
  pub kind:   Option<BeneficiaryKind>,
  /// Case-insensitive substring of the name.
  pub search: Option<String>,
  /// `None` returns active and inactive beneficiaries alike.
  pub active: Option<bool>,
}

/// Parameters for [`PantryStore::list_movements`].
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
  pub beneficiary_id: Option<Uuid>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the Pantry data store.
///
/// Lists come back in a fixed order and are empty when nothing matches.
/// `get_*` returns `None` for a missing id; `update_*` and `delete_*` report a
/// missing id as an error.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PantryStore: WebhookSource {
  // ── Inventory ─────────────────────────────────────────────────────────

  /// Newest first.
  fn list_items<'a>(
    &'a self,
    filter: &'a InventoryFilter,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + 'a;

  fn get_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<InventoryItem>, Self::Error>> + Send + '_;

  fn create_item(
    &self,
    input: NewInventoryItem,
  ) -> impl Future<Output = Result<InventoryItem, Self::Error>> + Send + '_;

  fn update_item(
    &self,
    id: Uuid,
    patch: InventoryPatch,
  ) -> impl Future<Output = Result<InventoryItem, Self::Error>> + Send + '_;

  fn delete_item(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Items with a positive quantity, ordered by name.
  fn available_stock(
    &self,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  /// The `limit` most recently registered items.
  fn recent_items(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  /// Items registered in `[from, until)`.
  fn items_created_between(
    &self,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  /// In-stock items with an expiry date on or before `date`.
  fn items_expiring_by(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  // ── Beneficiaries ─────────────────────────────────────────────────────

  /// Ordered by name.
  fn list_beneficiaries<'a>(
    &'a self,
    filter: &'a BeneficiaryFilter,
  ) -> impl Future<Output = Result<Vec<Beneficiary>, Self::Error>> + Send + 'a;

  fn get_beneficiary(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Beneficiary>, Self::Error>> + Send + '_;

  fn create_beneficiary(
    &self,
    input: NewBeneficiary,
  ) -> impl Future<Output = Result<Beneficiary, Self::Error>> + Send + '_;

  fn update_beneficiary(
    &self,
    id: Uuid,
    patch: BeneficiaryPatch,
  ) -> impl Future<Output = Result<Beneficiary, Self::Error>> + Send + '_;

  fn delete_beneficiary(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Active beneficiaries only, ordered by name.
  fn active_beneficiaries(
    &self,
  ) -> impl Future<Output = Result<Vec<Beneficiary>, Self::Error>> + Send + '_;

  // ── Donation movements ────────────────────────────────────────────────

  /// Newest first, with beneficiary and deliverer names embedded.
  fn list_movements<'a>(
    &'a self,
    filter: &'a MovementFilter,
  ) -> impl Future<Output = Result<Vec<MovementView>, Self::Error>> + Send + 'a;

  /// Record a delivery. Atomically snapshots each line's item name and
  /// deducts the delivered quantity from stock; fails without side effects
  /// if any line asks for more than is on hand.
  fn create_movement(
    &self,
    input: NewMovement,
  ) -> impl Future<Output = Result<DonationMovement, Self::Error>> + Send + '_;

  fn delete_movement(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn recent_movements(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<MovementView>, Self::Error>> + Send + '_;

  /// Movements delivered in `[from, until)`.
  fn movements_delivered_between(
    &self,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<DonationMovement>, Self::Error>> + Send + '_;

  // ── Webhook configuration ─────────────────────────────────────────────

  /// Newest first.
  fn list_webhooks(
    &self,
  ) -> impl Future<Output = Result<Vec<WebhookConfig>, Self::Error>> + Send + '_;

  fn create_webhook(
    &self,
    input: NewWebhookConfig,
  ) -> impl Future<Output = Result<WebhookConfig, Self::Error>> + Send + '_;

  fn set_webhook_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<WebhookConfig, Self::Error>> + Send + '_;

  fn delete_webhook(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Ordered by full name.
  fn list_profiles(&self) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  fn set_role(
    &self,
    id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;
}
