//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order
//! and range filters can compare strings directly. Calendar dates are stored
//! as `YYYY-MM-DD`. Line items are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.
//!
//! Every `Raw*` row type converts into its domain record through an explicit
//! decoding step that rejects malformed values.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use pantry_core::{
  beneficiary::Beneficiary,
  inventory::InventoryItem,
  movement::{DonationMovement, MovementLine, MovementView},
  profile::Profile,
  webhook::WebhookConfig,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// The current time at the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn decode_quantity(n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("quantity out of range: {n}")))
}

pub fn encode_lines(lines: &[MovementLine]) -> Result<String> { Ok(serde_json::to_string(lines)?) }

pub fn decode_lines(s: &str) -> Result<Vec<MovementLine>> { Ok(serde_json::from_str(s)?) }

/// `%term%` for a `LIKE ... ESCAPE '\'` clause, with wildcards in `term`
/// matched literally.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Inventory ───────────────────────────────────────────────────────────────

pub const ITEM_COLUMNS: &str = "id, created_at, item_name, category, quantity, donor_name, \
                                received_date, expiry_date, photo_url, created_by";

pub struct RawItem {
  pub id:            String,
  pub created_at:    String,
  pub item_name:     String,
  pub category:      String,
  pub quantity:      i64,
  pub donor_name:    Option<String>,
  pub received_date: String,
  pub expiry_date:   Option<String>,
  pub photo_url:     Option<String>,
  pub created_by:    String,
}

impl RawItem {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get("id")?,
      created_at:    row.get("created_at")?,
      item_name:     row.get("item_name")?,
      category:      row.get("category")?,
      quantity:      row.get("quantity")?,
      donor_name:    row.get("donor_name")?,
      received_date: row.get("received_date")?,
      expiry_date:   row.get("expiry_date")?,
      photo_url:     row.get("photo_url")?,
      created_by:    row.get("created_by")?,
    })
  }

  pub fn into_item(self) -> Result<InventoryItem> {
    Ok(InventoryItem {
      id:            decode_uuid(&self.id)?,
      created_at:    decode_dt(&self.created_at)?,
      item_name:     self.item_name,
      category:      self.category.parse()?,
      quantity:      decode_quantity(self.quantity)?,
      donor_name:    self.donor_name,
      received_date: decode_date(&self.received_date)?,
      expiry_date:   self.expiry_date.as_deref().map(decode_date).transpose()?,
      photo_url:     self.photo_url,
      created_by:    decode_uuid(&self.created_by)?,
    })
  }
}

// ─── Beneficiaries ───────────────────────────────────────────────────────────

pub const BENEFICIARY_COLUMNS: &str = "id, name, kind, document, address, contact_info, \
                                       responsible_person, active, created_at";

pub struct RawBeneficiary {
  pub id:                 String,
  pub name:               String,
  pub kind:               String,
  pub document:           Option<String>,
  pub address:            Option<String>,
  pub contact_info:       Option<String>,
  pub responsible_person: Option<String>,
  pub active:             bool,
  pub created_at:         String,
}

impl RawBeneficiary {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get("id")?,
      name:               row.get("name")?,
      kind:               row.get("kind")?,
      document:           row.get("document")?,
      address:            row.get("address")?,
      contact_info:       row.get("contact_info")?,
      responsible_person: row.get("responsible_person")?,
      active:             row.get("active")?,
      created_at:         row.get("created_at")?,
    })
  }

  pub fn into_beneficiary(self) -> Result<Beneficiary> {
    Ok(Beneficiary {
      id:                 decode_uuid(&self.id)?,
      name:               self.name,
      kind:               self.kind.parse()?,
      document:           self.document,
      address:            self.address,
      contact_info:       self.contact_info,
      responsible_person: self.responsible_person,
      active:             self.active,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

// ─── Movements ───────────────────────────────────────────────────────────────

/// Columns of a movement joined with beneficiary and deliverer names; the
/// query must alias `donation_movements` as `m`, `beneficiaries` as `b` and
/// `profiles` as `p`.
pub const MOVEMENT_VIEW_COLUMNS: &str = "m.id AS id, m.beneficiary_id AS beneficiary_id, \
                                         m.items_json AS items_json, \
                                         m.delivered_at AS delivered_at, \
                                         m.evidence_photo_url AS evidence_photo_url, \
                                         m.delivered_by AS delivered_by, \
                                         m.created_at AS created_at, \
                                         b.name AS beneficiary_name, \
                                         p.full_name AS delivered_by_name";

pub const MOVEMENT_COLUMNS: &str = "id, beneficiary_id, items_json, delivered_at, \
                                    evidence_photo_url, delivered_by, created_at";

pub struct RawMovement {
  pub id:                 String,
  pub beneficiary_id:     String,
  pub items_json:         String,
  pub delivered_at:       String,
  pub evidence_photo_url: Option<String>,
  pub delivered_by:       String,
  pub created_at:         String,
}

impl RawMovement {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get("id")?,
      beneficiary_id:     row.get("beneficiary_id")?,
      items_json:         row.get("items_json")?,
      delivered_at:       row.get("delivered_at")?,
      evidence_photo_url: row.get("evidence_photo_url")?,
      delivered_by:       row.get("delivered_by")?,
      created_at:         row.get("created_at")?,
    })
  }

  pub fn into_movement(self) -> Result<DonationMovement> {
    Ok(DonationMovement {
      id:                 decode_uuid(&self.id)?,
      beneficiary_id:     decode_uuid(&self.beneficiary_id)?,
      items:              decode_lines(&self.items_json)?,
      delivered_at:       decode_dt(&self.delivered_at)?,
      evidence_photo_url: self.evidence_photo_url,
      delivered_by:       decode_uuid(&self.delivered_by)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawMovementView {
  pub movement:          RawMovement,
  pub beneficiary_name:  Option<String>,
  pub delivered_by_name: Option<String>,
}

impl RawMovementView {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      movement:          RawMovement::from_row(row)?,
      beneficiary_name:  row.get("beneficiary_name")?,
      delivered_by_name: row.get("delivered_by_name")?,
    })
  }

  pub fn into_view(self) -> Result<MovementView> {
    Ok(MovementView {
      movement:          self.movement.into_movement()?,
      beneficiary_name:  self.beneficiary_name,
      delivered_by_name: self.delivered_by_name,
    })
  }
}

// ─── Webhooks ────────────────────────────────────────────────────────────────

pub const WEBHOOK_COLUMNS: &str = "id, event_type, url, active, created_at, created_by";

pub struct RawWebhook {
  pub id:         String,
  pub event_type: String,
  pub url:        String,
  pub active:     bool,
  pub created_at: String,
  pub created_by: String,
}

impl RawWebhook {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get("id")?,
      event_type: row.get("event_type")?,
      url:        row.get("url")?,
      active:     row.get("active")?,
      created_at: row.get("created_at")?,
      created_by: row.get("created_by")?,
    })
  }

  pub fn into_webhook(self) -> Result<WebhookConfig> {
    Ok(WebhookConfig {
      id:         decode_uuid(&self.id)?,
      event_type: self.event_type,
      url:        self.url,
      active:     self.active,
      created_at: decode_dt(&self.created_at)?,
      created_by: decode_uuid(&self.created_by)?,
    })
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str = "id, full_name, role, avatar_url, created_at";

pub struct RawProfile {
  pub id:         String,
  pub full_name:  String,
  pub role:       String,
  pub avatar_url: Option<String>,
  pub created_at: String,
}

impl RawProfile {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get("id")?,
      full_name:  row.get("full_name")?,
      role:       row.get("role")?,
      avatar_url: row.get("avatar_url")?,
      created_at: row.get("created_at")?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      id:         decode_uuid(&self.id)?,
      full_name:  self.full_name,
      role:       self.role.parse()?,
      avatar_url: self.avatar_url,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = encode_dt(DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z").unwrap().into());
    let b = encode_dt(DateTime::parse_from_rfc3339("2026-03-01T10:00:00.5Z").unwrap().into());
    assert_eq!(a, "2026-03-01T09:00:00.000000Z");
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap().timestamp_subsec_millis(), 500);
  }

  #[test]
  fn malformed_columns_are_rejected() {
    assert!(decode_dt("yesterday").is_err());
    assert!(decode_date("2026-13-01").is_err());
    assert!(decode_quantity(-1).is_err());
    assert!(decode_uuid("not-a-uuid").is_err());
  }

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("rice"), "%rice%");
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
  }
}
