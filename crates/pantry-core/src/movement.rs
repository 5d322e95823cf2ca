//! Donation movements: recorded deliveries of stock to a beneficiary.
//!
//! Line items are a snapshot. The item name is copied from the inventory at
//! delivery time and is never re-derived on read, so renaming or deleting an
//! inventory item leaves past deliveries intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// One delivered line, as recorded at delivery time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLine {
  pub inventory_item_id: Uuid,
  pub item_name:         String,
  pub quantity:          u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationMovement {
  pub id:                 Uuid,
  pub beneficiary_id:     Uuid,
  pub items:              Vec<MovementLine>,
  pub delivered_at:       DateTime<Utc>,
  pub evidence_photo_url: Option<String>,
  /// Profile id of the volunteer who made the delivery.
  pub delivered_by:       Uuid,
  pub created_at:         DateTime<Utc>,
}

impl DonationMovement {
  pub fn total_quantity(&self) -> u64 {
    self.items.iter().map(|l| u64::from(l.quantity)).sum()
  }
}

/// A movement with the related beneficiary and deliverer names embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementView {
  #[serde(flatten)]
  pub movement:          DonationMovement,
  pub beneficiary_name:  Option<String>,
  pub delivered_by_name: Option<String>,
}

// ─── NewMovement ─────────────────────────────────────────────────────────────

/// A requested line; the store fills in the item name snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovementLine {
  pub inventory_item_id: Uuid,
  pub quantity:          u32,
}

/// Input to [`crate::store::PantryStore::create_movement`].
#[derive(Debug, Clone)]
pub struct NewMovement {
  pub beneficiary_id:     Uuid,
  pub items:              Vec<NewMovementLine>,
  pub delivered_at:       DateTime<Utc>,
  pub evidence_photo_url: Option<String>,
  pub delivered_by:       Uuid,
}

impl NewMovement {
  /// At least one line, and no line with a zero quantity.
  pub fn validate(&self) -> Result<()> {
    if self.items.is_empty() {
      return Err(Error::EmptyMovement);
    }
    if let Some(line) = self.items.iter().find(|l| l.quantity == 0) {
      return Err(Error::ZeroQuantity(line.inventory_item_id));
    }
    Ok(())
  }
}
