//! [`SqliteStore`], the SQLite implementation of [`PantryStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, SubsecRound as _, TimeDelta, Utc};
use rusqlite::{OptionalExtension as _, Row, types::Value};
use uuid::Uuid;

use pantry_core::{
  beneficiary::{Beneficiary, BeneficiaryPatch, NewBeneficiary},
  inventory::{InventoryItem, InventoryPatch, NewInventoryItem},
  movement::{DonationMovement, MovementLine, MovementView, NewMovement},
  profile::{Profile, Role},
  store::{BeneficiaryFilter, InventoryFilter, MovementFilter, PantryStore},
  webhook::{NewWebhookConfig, WebhookConfig, WebhookSource},
};

use crate::{
  Error, Result,
  encode::{
    BENEFICIARY_COLUMNS, ITEM_COLUMNS, MOVEMENT_COLUMNS, MOVEMENT_VIEW_COLUMNS,
    PROFILE_COLUMNS, RawBeneficiary, RawItem, RawMovement, RawMovementView, RawProfile,
    RawWebhook, WEBHOOK_COLUMNS, decode_quantity, encode_date, encode_dt, encode_lines,
    encode_uuid, like_pattern, now,
  },
  schema::SCHEMA,
};

const MOVEMENT_VIEW_FROM: &str = "FROM donation_movements m
     LEFT JOIN beneficiaries b ON b.id = m.beneficiary_id
     LEFT JOIN profiles      p ON p.id = m.delivered_by";

fn where_clause(conds: &[&str]) -> String {
  if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  }
}

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pantry store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn:           tokio_rusqlite::Connection,
  pub(crate) session_ttl:    TimeDelta,
  pub(crate) magic_link_ttl: TimeDelta,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self {
      conn,
      session_ttl: TimeDelta::days(7),
      magic_link_ttl: TimeDelta::minutes(15),
    };
    store
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(store)
  }

  /// How long a session stays valid after sign-in.
  pub fn with_session_ttl(mut self, ttl: TimeDelta) -> Self {
    self.session_ttl = ttl;
    self
  }

  /// Run `sql` with positional `params` and decode every row.
  async fn fetch<R, T>(
    &self,
    sql: String,
    params: Vec<Value>,
    read: fn(&Row<'_>) -> rusqlite::Result<R>,
    decode: fn(R) -> Result<T>,
  ) -> Result<Vec<T>>
  where
    R: Send + 'static,
  {
    let raws: Vec<R> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(decode).collect()
  }

  /// Like [`Self::fetch`] but for at most one row.
  async fn fetch_one<R, T>(
    &self,
    sql: String,
    params: Vec<Value>,
    read: fn(&Row<'_>) -> rusqlite::Result<R>,
    decode: fn(R) -> Result<T>,
  ) -> Result<Option<T>>
  where
    R: Send + 'static,
  {
    let raw: Option<R> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), read).optional()?)
      })
      .await?;

    raw.map(decode).transpose()
  }

  /// Execute a single-row write; zero affected rows means `entity` with `id`
  /// does not exist.
  async fn execute_one(
    &self,
    entity: &'static str,
    id: Uuid,
    sql: &'static str,
    params: Vec<Value>,
  ) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params.iter()))?))
      .await?;

    if changed == 0 {
      return Err(Error::not_found(entity, id));
    }
    Ok(())
  }
}

// ─── WebhookSource impl ──────────────────────────────────────────────────────

impl WebhookSource for SqliteStore {
  type Error = Error;

  async fn active_webhooks(&self, event_type: &str) -> Result<Vec<WebhookConfig>> {
    self
      .fetch(
        format!(
          "SELECT {WEBHOOK_COLUMNS} FROM webhook_configs
           WHERE event_type = ?1 AND active = 1
           ORDER BY created_at, rowid"
        ),
        vec![text(event_type)],
        RawWebhook::from_row,
        RawWebhook::into_webhook,
      )
      .await
  }
}

// ─── PantryStore impl ────────────────────────────────────────────────────────

impl PantryStore for SqliteStore {
  // ── Inventory ─────────────────────────────────────────────────────────────

  async fn list_items(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>> {
    let mut conds = Vec::new();
    let mut params = Vec::new();
    if let Some(category) = filter.category {
      conds.push("category = ?");
      params.push(text(category.as_str()));
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
      conds.push("item_name LIKE ? ESCAPE '\\'");
      params.push(text(like_pattern(term)));
    }

    let sql = format!(
      "SELECT {ITEM_COLUMNS} FROM inventory_items {}
       ORDER BY created_at DESC, rowid DESC",
      where_clause(&conds)
    );
    self.fetch(sql, params, RawItem::from_row, RawItem::into_item).await
  }

  async fn get_item(&self, id: Uuid) -> Result<Option<InventoryItem>> {
    self
      .fetch_one(
        format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1"),
        vec![text(encode_uuid(id))],
        RawItem::from_row,
        RawItem::into_item,
      )
      .await
  }

  async fn create_item(&self, input: NewInventoryItem) -> Result<InventoryItem> {
    let item = InventoryItem {
      id:            Uuid::new_v4(),
      created_at:    now(),
      item_name:     input.item_name,
      category:      input.category,
      quantity:      input.quantity,
      donor_name:    input.donor_name,
      received_date: input.received_date,
      expiry_date:   input.expiry_date,
      photo_url:     input.photo_url,
      created_by:    input.created_by,
    };

    let id_str       = encode_uuid(item.id);
    let at_str       = encode_dt(item.created_at);
    let name         = item.item_name.clone();
    let category     = item.category.as_str();
    let quantity     = item.quantity;
    let donor        = item.donor_name.clone();
    let received_str = encode_date(item.received_date);
    let expiry_str   = item.expiry_date.map(encode_date);
    let photo        = item.photo_url.clone();
    let by_str       = encode_uuid(item.created_by);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO inventory_items (
             id, created_at, item_name, category, quantity, donor_name,
             received_date, expiry_date, photo_url, created_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            at_str,
            name,
            category,
            quantity,
            donor,
            received_str,
            expiry_str,
            photo,
            by_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(item)
  }

  async fn update_item(&self, id: Uuid, patch: InventoryPatch) -> Result<InventoryItem> {
    let id_str = encode_uuid(id);

    let outcome: Result<InventoryItem> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1"),
            rusqlite::params![id_str],
            RawItem::from_row,
          )
          .optional()?;
        let mut item = match raw.map(RawItem::into_item).transpose() {
          Ok(Some(item)) => item,
          Ok(None) => return Ok(Err(Error::not_found("inventory item", &id_str))),
          Err(e) => return Ok(Err(e)),
        };

        patch.apply(&mut item);

        tx.execute(
          "UPDATE inventory_items SET
             item_name = ?2, category = ?3, quantity = ?4, donor_name = ?5,
             received_date = ?6, expiry_date = ?7, photo_url = ?8
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            item.item_name,
            item.category.as_str(),
            item.quantity,
            item.donor_name,
            encode_date(item.received_date),
            item.expiry_date.map(encode_date),
            item.photo_url,
          ],
        )?;
        tx.commit()?;
        Ok(Ok(item))
      })
      .await?;

    outcome
  }

  async fn delete_item(&self, id: Uuid) -> Result<()> {
    self
      .execute_one(
        "inventory item",
        id,
        "DELETE FROM inventory_items WHERE id = ?1",
        vec![text(encode_uuid(id))],
      )
      .await
  }

  async fn available_stock(&self) -> Result<Vec<InventoryItem>> {
    self
      .fetch(
        format!(
          "SELECT {ITEM_COLUMNS} FROM inventory_items
           WHERE quantity > 0
           ORDER BY item_name COLLATE NOCASE, rowid"
        ),
        Vec::new(),
        RawItem::from_row,
        RawItem::into_item,
      )
      .await
  }

  async fn recent_items(&self, limit: usize) -> Result<Vec<InventoryItem>> {
    self
      .fetch(
        format!(
          "SELECT {ITEM_COLUMNS} FROM inventory_items
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?1"
        ),
        vec![Value::Integer(limit as i64)],
        RawItem::from_row,
        RawItem::into_item,
      )
      .await
  }

  async fn items_created_between(
    &self,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Vec<InventoryItem>> {
    self
      .fetch(
        format!(
          "SELECT {ITEM_COLUMNS} FROM inventory_items
           WHERE created_at >= ?1 AND created_at < ?2
           ORDER BY created_at, rowid"
        ),
        vec![text(encode_dt(from)), text(encode_dt(until))],
        RawItem::from_row,
        RawItem::into_item,
      )
      .await
  }

  async fn items_expiring_by(&self, date: NaiveDate) -> Result<Vec<InventoryItem>> {
    self
      .fetch(
        format!(
          "SELECT {ITEM_COLUMNS} FROM inventory_items
           WHERE quantity > 0 AND expiry_date IS NOT NULL AND expiry_date <= ?1
           ORDER BY expiry_date, rowid"
        ),
        vec![text(encode_date(date))],
        RawItem::from_row,
        RawItem::into_item,
      )
      .await
  }

  // ── Beneficiaries ─────────────────────────────────────────────────────────

  async fn list_beneficiaries(&self, filter: &BeneficiaryFilter) -> Result<Vec<Beneficiary>> {
    let mut conds = Vec::new();
    let mut params = Vec::new();
    if let Some(kind) = filter.kind {
      conds.push("kind = ?");
      params.push(text(kind.as_str()));
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
      conds.push("name LIKE ? ESCAPE '\\'");
      params.push(text(like_pattern(term)));
    }
    if let Some(active) = filter.active {
      conds.push("active = ?");
      params.push(Value::Integer(i64::from(active)));
    }

    let sql = format!(
      "SELECT {BENEFICIARY_COLUMNS} FROM beneficiaries {}
       ORDER BY name COLLATE NOCASE, rowid",
      where_clause(&conds)
    );
    self.fetch(sql, params, RawBeneficiary::from_row, RawBeneficiary::into_beneficiary).await
  }

  async fn get_beneficiary(&self, id: Uuid) -> Result<Option<Beneficiary>> {
    self
      .fetch_one(
        format!("SELECT {BENEFICIARY_COLUMNS} FROM beneficiaries WHERE id = ?1"),
        vec![text(encode_uuid(id))],
        RawBeneficiary::from_row,
        RawBeneficiary::into_beneficiary,
      )
      .await
  }

  async fn create_beneficiary(&self, input: NewBeneficiary) -> Result<Beneficiary> {
    let input = input.normalized()?;
    let beneficiary = Beneficiary {
      id:                 Uuid::new_v4(),
      name:               input.name,
      kind:               input.kind,
      document:           input.document,
      address:            input.address,
      contact_info:       input.contact_info,
      responsible_person: input.responsible_person,
      active:             input.active,
      created_at:         now(),
    };

    let row = beneficiary.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO beneficiaries (
             id, name, kind, document, address, contact_info,
             responsible_person, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            encode_uuid(row.id),
            row.name,
            row.kind.as_str(),
            row.document,
            row.address,
            row.contact_info,
            row.responsible_person,
            row.active,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(beneficiary)
  }

  async fn update_beneficiary(&self, id: Uuid, patch: BeneficiaryPatch) -> Result<Beneficiary> {
    let id_str = encode_uuid(id);

    let outcome: Result<Beneficiary> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {BENEFICIARY_COLUMNS} FROM beneficiaries WHERE id = ?1"),
            rusqlite::params![id_str],
            RawBeneficiary::from_row,
          )
          .optional()?;
        let mut beneficiary = match raw.map(RawBeneficiary::into_beneficiary).transpose() {
          Ok(Some(b)) => b,
          Ok(None) => return Ok(Err(Error::not_found("beneficiary", &id_str))),
          Err(e) => return Ok(Err(e)),
        };
        match patch.normalized(&beneficiary) {
          Ok(patch) => patch.apply(&mut beneficiary),
          Err(e) => return Ok(Err(e.into())),
        }

        tx.execute(
          "UPDATE beneficiaries SET
             name = ?2, kind = ?3, document = ?4, address = ?5,
             contact_info = ?6, responsible_person = ?7, active = ?8
           WHERE id = ?1",
          rusqlite::params![
            id_str,
            beneficiary.name,
            beneficiary.kind.as_str(),
            beneficiary.document,
            beneficiary.address,
            beneficiary.contact_info,
            beneficiary.responsible_person,
            beneficiary.active,
          ],
        )?;
        tx.commit()?;
        Ok(Ok(beneficiary))
      })
      .await?;

    outcome
  }

  async fn delete_beneficiary(&self, id: Uuid) -> Result<()> {
    self
      .execute_one(
        "beneficiary",
        id,
        "DELETE FROM beneficiaries WHERE id = ?1",
        vec![text(encode_uuid(id))],
      )
      .await
  }

  async fn active_beneficiaries(&self) -> Result<Vec<Beneficiary>> {
    let filter = BeneficiaryFilter { active: Some(true), ..Default::default() };
    self.list_beneficiaries(&filter).await
  }

  // ── Donation movements ────────────────────────────────────────────────────

  async fn list_movements(&self, filter: &MovementFilter) -> Result<Vec<MovementView>> {
    let mut conds = Vec::new();
    let mut params = Vec::new();
    if let Some(beneficiary_id) = filter.beneficiary_id {
      conds.push("m.beneficiary_id = ?");
      params.push(text(encode_uuid(beneficiary_id)));
    }

    let sql = format!(
      "SELECT {MOVEMENT_VIEW_COLUMNS} {MOVEMENT_VIEW_FROM} {}
       ORDER BY m.created_at DESC, m.rowid DESC",
      where_clause(&conds)
    );
    self.fetch(sql, params, RawMovementView::from_row, RawMovementView::into_view).await
  }

  async fn create_movement(&self, input: NewMovement) -> Result<DonationMovement> {
    input.validate()?;

    let id         = Uuid::new_v4();
    let created_at = now();

    let outcome: Result<DonationMovement> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let beneficiary_str = encode_uuid(input.beneficiary_id);
        let known = tx
          .query_row(
            "SELECT 1 FROM beneficiaries WHERE id = ?1",
            rusqlite::params![beneficiary_str],
            |_| Ok(()),
          )
          .optional()?;
        if known.is_none() {
          return Ok(Err(Error::not_found("beneficiary", input.beneficiary_id)));
        }

        // Snapshot names and deduct stock line by line; a repeated item sees
        // the quantity left by the earlier line.
        let mut lines = Vec::with_capacity(input.items.len());
        for line in &input.items {
          let item_str = encode_uuid(line.inventory_item_id);
          let row: Option<(String, i64)> = tx
            .query_row(
              "SELECT item_name, quantity FROM inventory_items WHERE id = ?1",
              rusqlite::params![item_str],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
          let Some((item_name, on_hand)) = row else {
            return Ok(Err(Error::not_found("inventory item", line.inventory_item_id)));
          };
          let available = match decode_quantity(on_hand) {
            Ok(q) => q,
            Err(e) => return Ok(Err(e)),
          };
          if line.quantity > available {
            return Ok(Err(Error::InsufficientStock {
              item_id: line.inventory_item_id,
              requested: line.quantity,
              available,
            }));
          }

          tx.execute(
            "UPDATE inventory_items SET quantity = quantity - ?2 WHERE id = ?1",
            rusqlite::params![item_str, line.quantity],
          )?;
          lines.push(MovementLine {
            inventory_item_id: line.inventory_item_id,
            item_name,
            quantity: line.quantity,
          });
        }

        let movement = DonationMovement {
          id,
          beneficiary_id: input.beneficiary_id,
          items: lines,
          delivered_at: input.delivered_at.trunc_subsecs(6),
          evidence_photo_url: input.evidence_photo_url,
          delivered_by: input.delivered_by,
          created_at,
        };
        let items_json = match encode_lines(&movement.items) {
          Ok(json) => json,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "INSERT INTO donation_movements (
             id, beneficiary_id, items_json, delivered_at,
             evidence_photo_url, delivered_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(movement.id),
            beneficiary_str,
            items_json,
            encode_dt(movement.delivered_at),
            movement.evidence_photo_url,
            encode_uuid(movement.delivered_by),
            encode_dt(movement.created_at),
          ],
        )?;
        tx.commit()?;
        Ok(Ok(movement))
      })
      .await?;

    outcome
  }

  /// Removes the movement and puts its quantities back on the items that
  /// still exist.
  async fn delete_movement(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let outcome: Result<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {MOVEMENT_COLUMNS} FROM donation_movements WHERE id = ?1"),
            rusqlite::params![id_str],
            RawMovement::from_row,
          )
          .optional()?;
        let movement = match raw.map(RawMovement::into_movement).transpose() {
          Ok(Some(m)) => m,
          Ok(None) => return Ok(Err(Error::not_found("movement", &id_str))),
          Err(e) => return Ok(Err(e)),
        };

        for line in &movement.items {
          tx.execute(
            "UPDATE inventory_items SET quantity = quantity + ?2 WHERE id = ?1",
            rusqlite::params![encode_uuid(line.inventory_item_id), line.quantity],
          )?;
        }
        tx.execute("DELETE FROM donation_movements WHERE id = ?1", rusqlite::params![id_str])?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    outcome
  }

  async fn recent_movements(&self, limit: usize) -> Result<Vec<MovementView>> {
    self
      .fetch(
        format!(
          "SELECT {MOVEMENT_VIEW_COLUMNS} {MOVEMENT_VIEW_FROM}
           ORDER BY m.created_at DESC, m.rowid DESC
           LIMIT ?1"
        ),
        vec![Value::Integer(limit as i64)],
        RawMovementView::from_row,
        RawMovementView::into_view,
      )
      .await
  }

  async fn movements_delivered_between(
    &self,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Vec<DonationMovement>> {
    self
      .fetch(
        format!(
          "SELECT {MOVEMENT_COLUMNS} FROM donation_movements
           WHERE delivered_at >= ?1 AND delivered_at < ?2
           ORDER BY delivered_at, rowid"
        ),
        vec![text(encode_dt(from)), text(encode_dt(until))],
        RawMovement::from_row,
        RawMovement::into_movement,
      )
      .await
  }

  // ── Webhook configuration ─────────────────────────────────────────────────

  async fn list_webhooks(&self) -> Result<Vec<WebhookConfig>> {
    self
      .fetch(
        format!("SELECT {WEBHOOK_COLUMNS} FROM webhook_configs ORDER BY created_at DESC, rowid DESC"),
        Vec::new(),
        RawWebhook::from_row,
        RawWebhook::into_webhook,
      )
      .await
  }

  async fn create_webhook(&self, input: NewWebhookConfig) -> Result<WebhookConfig> {
    input.validate()?;
    let config = WebhookConfig {
      id:         Uuid::new_v4(),
      event_type: input.event_type,
      url:        input.url,
      active:     input.active,
      created_at: now(),
      created_by: input.created_by,
    };

    let row = config.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO webhook_configs (id, event_type, url, active, created_at, created_by)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            encode_uuid(row.id),
            row.event_type,
            row.url,
            row.active,
            encode_dt(row.created_at),
            encode_uuid(row.created_by),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(config)
  }

  async fn set_webhook_active(&self, id: Uuid, active: bool) -> Result<WebhookConfig> {
    self
      .execute_one(
        "webhook",
        id,
        "UPDATE webhook_configs SET active = ?2 WHERE id = ?1",
        vec![text(encode_uuid(id)), Value::Integer(i64::from(active))],
      )
      .await?;

    self
      .fetch_one(
        format!("SELECT {WEBHOOK_COLUMNS} FROM webhook_configs WHERE id = ?1"),
        vec![text(encode_uuid(id))],
        RawWebhook::from_row,
        RawWebhook::into_webhook,
      )
      .await?
      .ok_or_else(|| Error::not_found("webhook", id))
  }

  async fn delete_webhook(&self, id: Uuid) -> Result<()> {
    self
      .execute_one(
        "webhook",
        id,
        "DELETE FROM webhook_configs WHERE id = ?1",
        vec![text(encode_uuid(id))],
      )
      .await
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    self
      .fetch_one(
        format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
        vec![text(encode_uuid(id))],
        RawProfile::from_row,
        RawProfile::into_profile,
      )
      .await
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    self
      .fetch(
        format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY full_name COLLATE NOCASE, rowid"),
        Vec::new(),
        RawProfile::from_row,
        RawProfile::into_profile,
      )
      .await
  }

  async fn set_role(&self, id: Uuid, role: Role) -> Result<Profile> {
    self
      .execute_one(
        "profile",
        id,
        "UPDATE profiles SET role = ?2 WHERE id = ?1",
        vec![text(encode_uuid(id)), text(role.as_str())],
      )
      .await?;

    self.get_profile(id).await?.ok_or_else(|| Error::not_found("profile", id))
  }
}
