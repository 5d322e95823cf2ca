//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, TimeDelta, TimeZone as _, Utc};
use pantry_core::{
  Classify as _, ErrorKind,
  auth::{AuthProvider, Credentials, SignUp},
  beneficiary::{BeneficiaryKind, BeneficiaryPatch, NewBeneficiary},
  inventory::{InventoryPatch, ItemCategory, NewInventoryItem},
  movement::{NewMovement, NewMovementLine},
  profile::Role,
  store::{BeneficiaryFilter, InventoryFilter, MovementFilter, PantryStore},
  webhook::{NewWebhookConfig, WebhookSource},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn volunteer(s: &SqliteStore, email: &str) -> Uuid {
  s.sign_up(SignUp {
    email:     email.into(),
    password:  "correct horse".into(),
    full_name: "Ana Volunteer".into(),
  })
  .await
  .unwrap()
  .user_id
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn rice(by: Uuid, quantity: u32) -> NewInventoryItem {
  NewInventoryItem::new("Rice 5kg", ItemCategory::Food, quantity, day(2026, 3, 1), by)
}

fn delivery(beneficiary_id: Uuid, by: Uuid, lines: &[(Uuid, u32)]) -> NewMovement {
  NewMovement {
    beneficiary_id,
    items: lines
      .iter()
      .map(|&(inventory_item_id, quantity)| NewMovementLine { inventory_item_id, quantity })
      .collect(),
    delivered_at: Utc::now(),
    evidence_photo_url: None,
    delivered_by: by,
  }
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_creates_member_profile() {
  let s = store().await;
  let id = volunteer(&s, "Ana@Example.org").await;

  let profile = s.get_profile(id).await.unwrap().unwrap();
  assert_eq!(profile.role, Role::Member);
  assert_eq!(profile.full_name, "Ana Volunteer");
  assert_eq!(s.find_user_by_email("ana@example.org".into()).await.unwrap(), Some(id));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let s = store().await;
  volunteer(&s, "ana@example.org").await;

  let err = s
    .sign_up(SignUp {
      email:     "ANA@example.org".into(),
      password:  "another one".into(),
      full_name: "Impostor".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn short_password_is_rejected() {
  let s = store().await;
  let err = s
    .sign_up(SignUp {
      email:     "ana@example.org".into(),
      password:  "12345".into(),
      full_name: "Ana".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::WeakPassword(6)));
}

#[tokio::test]
async fn password_sign_in_and_sign_out() {
  let s = store().await;
  let id = volunteer(&s, "ana@example.org").await;

  let wrong = s
    .sign_in_with_password(Credentials {
      email:    "ana@example.org".into(),
      password: "wrong horse".into(),
    })
    .await
    .unwrap_err();
  assert_eq!(wrong.kind(), ErrorKind::Unauthorized);

  let session = s
    .sign_in_with_password(Credentials {
      email:    "ana@example.org".into(),
      password: "correct horse".into(),
    })
    .await
    .unwrap();
  assert_eq!(session.user_id, id);

  let live = s.get_session(session.access_token.clone()).await.unwrap().unwrap();
  assert_eq!(live.email, "ana@example.org");

  s.sign_out(session.access_token.clone()).await.unwrap();
  assert!(s.get_session(session.access_token).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_sessions_are_not_returned() {
  let s = store().await.with_session_ttl(TimeDelta::zero());
  let session = s
    .sign_up(SignUp {
      email:     "ana@example.org".into(),
      password:  "correct horse".into(),
      full_name: "Ana".into(),
    })
    .await
    .unwrap();
  assert!(s.get_session(session.access_token).await.unwrap().is_none());
}

#[tokio::test]
async fn magic_links_are_single_use() {
  let s = store().await;
  let id = volunteer(&s, "ana@example.org").await;

  let link = s.request_magic_link("ana@example.org".into()).await.unwrap();
  let session = s.verify_magic_link(link.token.clone()).await.unwrap();
  assert_eq!(session.user_id, id);

  let again = s.verify_magic_link(link.token).await.unwrap_err();
  assert!(matches!(again, Error::InvalidToken));

  let unknown = s.request_magic_link("nobody@example.org".into()).await.unwrap_err();
  assert_eq!(unknown.kind(), ErrorKind::NotFound);
}

// ─── Inventory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_item() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;

  let mut input = rice(by, 10);
  input.donor_name = Some("Padaria Central".into());
  input.expiry_date = Some(day(2026, 9, 1));
  let item = s.create_item(input).await.unwrap();

  let fetched = s.get_item(item.id).await.unwrap().unwrap();
  assert_eq!(fetched, item);
  assert!(s.get_item(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_items_filters_and_orders_newest_first() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;

  let first = s.create_item(rice(by, 1)).await.unwrap();
  let coat = s
    .create_item(NewInventoryItem::new("Winter coat", ItemCategory::Clothing, 2, day(2026, 3, 2), by))
    .await
    .unwrap();
  let last = s
    .create_item(NewInventoryItem::new("50% off beans", ItemCategory::Food, 3, day(2026, 3, 3), by))
    .await
    .unwrap();

  let all = s.list_items(&InventoryFilter::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|i| i.id).collect();
  assert_eq!(ids, vec![last.id, coat.id, first.id]);

  let food = s
    .list_items(&InventoryFilter { category: Some(ItemCategory::Food), search: None })
    .await
    .unwrap();
  assert_eq!(food.len(), 2);

  let coats = s
    .list_items(&InventoryFilter { category: None, search: Some("COAT".into()) })
    .await
    .unwrap();
  assert_eq!(coats.len(), 1);
  assert_eq!(coats[0].id, coat.id);

  let literal = s
    .list_items(&InventoryFilter { category: None, search: Some("0%".into()) })
    .await
    .unwrap();
  assert_eq!(literal.len(), 1);
  assert_eq!(literal[0].id, last.id);
}

#[tokio::test]
async fn update_item_applies_patch() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let mut input = rice(by, 10);
  input.expiry_date = Some(day(2026, 9, 1));
  let item = s.create_item(input).await.unwrap();

  let patch: InventoryPatch =
    serde_json::from_str(r#"{"quantity": 4, "expiry_date": null}"#).unwrap();
  let updated = s.update_item(item.id, patch).await.unwrap();
  assert_eq!(updated.quantity, 4);
  assert_eq!(updated.expiry_date, None);
  assert_eq!(updated.item_name, "Rice 5kg");

  let stored = s.get_item(item.id).await.unwrap().unwrap();
  assert_eq!(stored, updated);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
  let s = store().await;
  let err = s.update_item(Uuid::new_v4(), InventoryPatch::default()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  let err = s.delete_item(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  let err = s.delete_beneficiary(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn available_stock_and_expiry_window() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;

  let mut soon = rice(by, 5);
  soon.item_name = "Milk".into();
  soon.expiry_date = Some(day(2026, 3, 5));
  let soon = s.create_item(soon).await.unwrap();

  let mut gone = rice(by, 0);
  gone.item_name = "Eggs".into();
  gone.expiry_date = Some(day(2026, 3, 4));
  s.create_item(gone).await.unwrap();

  let mut later = rice(by, 3);
  later.item_name = "beans".into();
  later.expiry_date = Some(day(2026, 12, 1));
  let later = s.create_item(later).await.unwrap();

  let stock = s.available_stock().await.unwrap();
  let names: Vec<_> = stock.iter().map(|i| i.item_name.as_str()).collect();
  assert_eq!(names, vec!["beans", "Milk"]);

  let expiring = s.items_expiring_by(day(2026, 3, 8)).await.unwrap();
  assert_eq!(expiring.len(), 1);
  assert_eq!(expiring[0].id, soon.id);
  assert!(!expiring.iter().any(|i| i.id == later.id));
}

#[tokio::test]
async fn recent_and_ranged_items() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  for n in 1..=4 {
    s.create_item(rice(by, n)).await.unwrap();
  }

  let recent = s.recent_items(2).await.unwrap();
  assert_eq!(recent.iter().map(|i| i.quantity).collect::<Vec<_>>(), vec![4, 3]);

  let now = Utc::now();
  let in_range = s
    .items_created_between(now - TimeDelta::hours(1), now + TimeDelta::hours(1))
    .await
    .unwrap();
  assert_eq!(in_range.len(), 4);

  let long_ago = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
  let none = s
    .items_created_between(long_ago, long_ago + TimeDelta::days(31))
    .await
    .unwrap();
  assert!(none.is_empty());
}

// ─── Beneficiaries ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_beneficiary_formats_document() {
  let s = store().await;
  let mut input = NewBeneficiary::new("Silva family", BeneficiaryKind::Household);
  input.document = Some("11144477735".into());

  let created = s.create_beneficiary(input).await.unwrap();
  assert_eq!(created.document.as_deref(), Some("111.444.777-35"));
  assert_eq!(s.get_beneficiary(created.id).await.unwrap().unwrap(), created);
}

#[tokio::test]
async fn invalid_document_is_rejected() {
  let s = store().await;
  let mut input = NewBeneficiary::new("Community kitchen", BeneficiaryKind::Organization);
  input.document = Some("11144477735".into());

  let err = s.create_beneficiary(input).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Invalid);
  assert!(s.list_beneficiaries(&BeneficiaryFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn beneficiary_filters() {
  let s = store().await;
  s.create_beneficiary(NewBeneficiary::new("zeta house", BeneficiaryKind::Household))
    .await
    .unwrap();
  let mut closed = NewBeneficiary::new("Alpha shelter", BeneficiaryKind::Organization);
  closed.active = false;
  s.create_beneficiary(closed).await.unwrap();
  s.create_beneficiary(NewBeneficiary::new("Beta shelter", BeneficiaryKind::Organization))
    .await
    .unwrap();

  let all = s.list_beneficiaries(&BeneficiaryFilter::default()).await.unwrap();
  let names: Vec<_> = all.iter().map(|b| b.name.as_str()).collect();
  assert_eq!(names, vec!["Alpha shelter", "Beta shelter", "zeta house"]);

  let active = s.active_beneficiaries().await.unwrap();
  assert_eq!(active.len(), 2);
  assert!(active.iter().all(|b| b.active));

  let shelters = s
    .list_beneficiaries(&BeneficiaryFilter {
      kind:   Some(BeneficiaryKind::Organization),
      search: Some("shelter".into()),
      active: None,
    })
    .await
    .unwrap();
  assert_eq!(shelters.len(), 2);
}

#[tokio::test]
async fn changing_kind_rechecks_stored_document() {
  let s = store().await;
  let mut input = NewBeneficiary::new("Silva family", BeneficiaryKind::Household);
  input.document = Some("111.444.777-35".into());
  let created = s.create_beneficiary(input).await.unwrap();

  let patch = BeneficiaryPatch { kind: Some(BeneficiaryKind::Organization), ..Default::default() };
  let err = s.update_beneficiary(created.id, patch).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Invalid);

  let patch = BeneficiaryPatch {
    kind: Some(BeneficiaryKind::Organization),
    document: Some(Some("11222333000181".into())),
    ..Default::default()
  };
  let updated = s.update_beneficiary(created.id, patch).await.unwrap();
  assert_eq!(updated.document.as_deref(), Some("11.222.333/0001-81"));
}

// ─── Movements ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn delivery_deducts_stock_and_snapshots_names() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let family = s
    .create_beneficiary(NewBeneficiary::new("Silva family", BeneficiaryKind::Household))
    .await
    .unwrap();
  let item = s.create_item(rice(by, 10)).await.unwrap();

  let movement = s.create_movement(delivery(family.id, by, &[(item.id, 4)])).await.unwrap();
  assert_eq!(movement.items[0].item_name, "Rice 5kg");
  assert_eq!(s.get_item(item.id).await.unwrap().unwrap().quantity, 6);

  // Deleting stock does not rewrite history.
  s.delete_item(item.id).await.unwrap();
  let listed = s.list_movements(&MovementFilter::default()).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].movement.items[0].item_name, "Rice 5kg");
  assert_eq!(listed[0].beneficiary_name.as_deref(), Some("Silva family"));
  assert_eq!(listed[0].delivered_by_name.as_deref(), Some("Ana Volunteer"));
}

#[tokio::test]
async fn insufficient_stock_leaves_everything_untouched() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let family = s
    .create_beneficiary(NewBeneficiary::new("Silva family", BeneficiaryKind::Household))
    .await
    .unwrap();
  let plenty = s.create_item(rice(by, 10)).await.unwrap();
  let scarce = s.create_item(rice(by, 1)).await.unwrap();

  let err = s
    .create_movement(delivery(family.id, by, &[(plenty.id, 5), (scarce.id, 2)]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InsufficientStock { requested: 2, available: 1, .. }));
  assert_eq!(err.kind(), ErrorKind::Invalid);

  assert_eq!(s.get_item(plenty.id).await.unwrap().unwrap().quantity, 10);
  assert!(s.list_movements(&MovementFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_lines_share_the_same_stock() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let family = s
    .create_beneficiary(NewBeneficiary::new("Silva family", BeneficiaryKind::Household))
    .await
    .unwrap();
  let item = s.create_item(rice(by, 5)).await.unwrap();

  let err = s
    .create_movement(delivery(family.id, by, &[(item.id, 3), (item.id, 3)]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InsufficientStock { available: 2, .. }));
}

#[tokio::test]
async fn movement_validation_and_unknown_references() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let family = s
    .create_beneficiary(NewBeneficiary::new("Silva family", BeneficiaryKind::Household))
    .await
    .unwrap();

  let empty = s.create_movement(delivery(family.id, by, &[])).await.unwrap_err();
  assert_eq!(empty.kind(), ErrorKind::Invalid);

  let unknown_item = s
    .create_movement(delivery(family.id, by, &[(Uuid::new_v4(), 1)]))
    .await
    .unwrap_err();
  assert_eq!(unknown_item.kind(), ErrorKind::NotFound);

  let item = s.create_item(rice(by, 5)).await.unwrap();
  let unknown_beneficiary = s
    .create_movement(delivery(Uuid::new_v4(), by, &[(item.id, 1)]))
    .await
    .unwrap_err();
  assert_eq!(unknown_beneficiary.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn deleting_a_movement_restores_stock() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let family = s
    .create_beneficiary(NewBeneficiary::new("Silva family", BeneficiaryKind::Household))
    .await
    .unwrap();
  let item = s.create_item(rice(by, 10)).await.unwrap();
  let movement = s.create_movement(delivery(family.id, by, &[(item.id, 7)])).await.unwrap();

  s.delete_movement(movement.id).await.unwrap();
  assert_eq!(s.get_item(item.id).await.unwrap().unwrap().quantity, 10);
  assert_eq!(s.delete_movement(movement.id).await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn beneficiary_with_history_cannot_be_deleted() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let family = s
    .create_beneficiary(NewBeneficiary::new("Silva family", BeneficiaryKind::Household))
    .await
    .unwrap();
  let item = s.create_item(rice(by, 10)).await.unwrap();
  s.create_movement(delivery(family.id, by, &[(item.id, 1)])).await.unwrap();

  let err = s.delete_beneficiary(family.id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn movements_filter_by_beneficiary_and_delivery_range() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let a = s
    .create_beneficiary(NewBeneficiary::new("A", BeneficiaryKind::Household))
    .await
    .unwrap();
  let b = s
    .create_beneficiary(NewBeneficiary::new("B", BeneficiaryKind::Household))
    .await
    .unwrap();
  let item = s.create_item(rice(by, 10)).await.unwrap();

  let mut march = delivery(a.id, by, &[(item.id, 1)]);
  march.delivered_at = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();
  s.create_movement(march).await.unwrap();
  let mut april = delivery(b.id, by, &[(item.id, 2)]);
  april.delivered_at = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
  s.create_movement(april).await.unwrap();

  let for_a = s
    .list_movements(&MovementFilter { beneficiary_id: Some(a.id) })
    .await
    .unwrap();
  assert_eq!(for_a.len(), 1);

  let in_march = s
    .movements_delivered_between(
      Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
      Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(in_march.len(), 1);
  assert_eq!(in_march[0].beneficiary_id, a.id);

  let recent = s.recent_movements(1).await.unwrap();
  assert_eq!(recent.len(), 1);
  assert_eq!(recent[0].movement.beneficiary_id, b.id);
}

// ─── Webhooks ────────────────────────────────────────────────────────────────

fn hook(by: Uuid, event_type: &str, url: &str, active: bool) -> NewWebhookConfig {
  NewWebhookConfig {
    event_type: event_type.into(),
    url: url.into(),
    active,
    created_by: by,
  }
}

#[tokio::test]
async fn active_webhooks_match_event_and_flag() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;

  let first = s
    .create_webhook(hook(by, "donation_received", "https://a.example/hook", true))
    .await
    .unwrap();
  s.create_webhook(hook(by, "donation_received", "https://b.example/hook", false))
    .await
    .unwrap();
  s.create_webhook(hook(by, "donation_delivered", "https://c.example/hook", true))
    .await
    .unwrap();

  let active = s.active_webhooks("donation_received").await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].id, first.id);

  let toggled = s.set_webhook_active(first.id, false).await.unwrap();
  assert!(!toggled.active);
  assert!(s.active_webhooks("donation_received").await.unwrap().is_empty());
  assert!(s.active_webhooks("unknown_event").await.unwrap().is_empty());

  assert_eq!(s.list_webhooks().await.unwrap().len(), 3);
  s.delete_webhook(first.id).await.unwrap();
  assert_eq!(s.list_webhooks().await.unwrap().len(), 2);
}

#[tokio::test]
async fn webhook_url_must_be_absolute() {
  let s = store().await;
  let by = volunteer(&s, "ana@example.org").await;
  let err = s
    .create_webhook(hook(by, "donation_received", "not a url", true))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Invalid);
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_role_promotes_user() {
  let s = store().await;
  let id = volunteer(&s, "ana@example.org").await;
  volunteer(&s, "bia@example.org").await;

  let promoted = s.set_role(id, Role::Admin).await.unwrap();
  assert!(promoted.is_admin());
  assert_eq!(s.list_profiles().await.unwrap().len(), 2);
  assert_eq!(
    s.set_role(Uuid::new_v4(), Role::Admin).await.unwrap_err().kind(),
    ErrorKind::NotFound
  );
}
