//! Inventory items: donated goods on hand.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, patch::nullable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
  Food,
  Clothing,
  Furniture,
  Financial,
}

impl ItemCategory {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Food => "food",
      Self::Clothing => "clothing",
      Self::Furniture => "furniture",
      Self::Financial => "financial",
    }
  }
}

impl FromStr for ItemCategory {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "food" => Ok(Self::Food),
      "clothing" => Ok(Self::Clothing),
      "furniture" => Ok(Self::Furniture),
      "financial" => Ok(Self::Financial),
      other => Err(Error::UnknownVariant { kind: "item category", value: other.to_owned() }),
    }
  }
}

impl fmt::Display for ItemCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A stock entry. `quantity` is unsigned, so it can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
  pub id:            Uuid,
  pub created_at:    DateTime<Utc>,
  pub item_name:     String,
  pub category:      ItemCategory,
  pub quantity:      u32,
  pub donor_name:    Option<String>,
  pub received_date: NaiveDate,
  pub expiry_date:   Option<NaiveDate>,
  pub photo_url:     Option<String>,
  /// Profile id of whoever registered the entry.
  pub created_by:    Uuid,
}

impl InventoryItem {
  /// Part of the available stock.
  pub fn is_available(&self) -> bool { self.quantity > 0 }

  /// In stock and expiring on or before `date`.
  pub fn expires_by(&self, date: NaiveDate) -> bool {
    self.is_available() && self.expiry_date.is_some_and(|d| d <= date)
  }
}

/// Input to [`crate::store::PantryStore::create_item`].
#[derive(Debug, Clone)]
pub struct NewInventoryItem {
  pub item_name:     String,
  pub category:      ItemCategory,
  pub quantity:      u32,
  pub donor_name:    Option<String>,
  pub received_date: NaiveDate,
  pub expiry_date:   Option<NaiveDate>,
  pub photo_url:     Option<String>,
  pub created_by:    Uuid,
}

impl NewInventoryItem {
  pub fn new(
    item_name: impl Into<String>,
    category: ItemCategory,
    quantity: u32,
    received_date: NaiveDate,
    created_by: Uuid,
  ) -> Self {
    Self {
      item_name: item_name.into(),
      category,
      quantity,
      donor_name: None,
      received_date,
      expiry_date: None,
      photo_url: None,
      created_by,
    }
  }
}

/// Partial update; `null` clears optional fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryPatch {
  pub item_name:     Option<String>,
  pub category:      Option<ItemCategory>,
  pub quantity:      Option<u32>,
  #[serde(default, deserialize_with = "nullable")]
  pub donor_name:    Option<Option<String>>,
  pub received_date: Option<NaiveDate>,
  #[serde(default, deserialize_with = "nullable")]
  pub expiry_date:   Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub photo_url:     Option<Option<String>>,
}

impl InventoryPatch {
  pub fn apply(self, target: &mut InventoryItem) {
    if let Some(v) = self.item_name {
      target.item_name = v;
    }
    if let Some(v) = self.category {
      target.category = v;
    }
    if let Some(v) = self.quantity {
      target.quantity = v;
    }
    if let Some(v) = self.donor_name {
      target.donor_name = v;
    }
    if let Some(v) = self.received_date {
      target.received_date = v;
    }
    if let Some(v) = self.expiry_date {
      target.expiry_date = v;
    }
    if let Some(v) = self.photo_url {
      target.photo_url = v;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rice(quantity: u32, expiry: Option<NaiveDate>) -> InventoryItem {
    InventoryItem {
      id: Uuid::new_v4(),
      created_at: Utc::now(),
      item_name: "Rice 5kg".into(),
      category: ItemCategory::Food,
      quantity,
      donor_name: None,
      received_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
      expiry_date: expiry,
      photo_url: None,
      created_by: Uuid::new_v4(),
    }
  }

  #[test]
  fn expiry_window_needs_stock_and_date() {
    let cutoff = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let soon = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    let later = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();

    assert!(rice(3, Some(soon)).expires_by(cutoff));
    assert!(rice(3, Some(cutoff)).expires_by(cutoff));
    assert!(!rice(3, Some(later)).expires_by(cutoff));
    assert!(!rice(0, Some(soon)).expires_by(cutoff));
    assert!(!rice(3, None).expires_by(cutoff));
  }

  #[test]
  fn negative_quantity_is_rejected_at_the_boundary() {
    let result: std::result::Result<InventoryPatch, _> =
      serde_json::from_str(r#"{"quantity": -1}"#);
    assert!(result.is_err());
  }

  #[test]
  fn category_round_trips_through_str() {
    for c in [ItemCategory::Food, ItemCategory::Clothing, ItemCategory::Furniture, ItemCategory::Financial] {
      assert_eq!(c.as_str().parse::<ItemCategory>().unwrap(), c);
    }
    assert!("toys".parse::<ItemCategory>().is_err());
  }
}
