//! Dashboard aggregates.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/dashboard/metrics` | [`MonthlyMetrics`] for the current UTC month |
//! | `GET` | `/dashboard/recent-entries` | `?limit`, default 5 |
//! | `GET` | `/dashboard/recent-exits` | `?limit`, default 5 |

use std::{collections::HashSet, fmt::Display};

use axum::extract::State;
use chrono::{DateTime, Datelike as _, Days, Months, NaiveDate, NaiveTime, Utc};
use pantry_core::{inventory::InventoryItem, movement::MovementView, store::PantryStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, Backend, CurrentUser, error::ApiError, extract::{Json, Query}};

/// How far ahead an expiry date counts as "soon".
pub const EXPIRY_WINDOW_DAYS: u64 = 7;

const DEFAULT_RECENT: usize = 5;
const MAX_RECENT: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyMetrics {
  pub baskets_delivered:    usize,
  /// Distinct beneficiaries among this month's deliveries.
  pub beneficiaries_served: usize,
  pub entries_this_month:   usize,
  pub items_expiring_soon:  usize,
}

/// `[first instant of the month of today, first instant of the next month)`.
pub fn month_bounds(today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
  let first = today - Days::new(u64::from(today.day0()));
  let next = first.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX);
  (first.and_time(NaiveTime::MIN).and_utc(), next.and_time(NaiveTime::MIN).and_utc())
}

fn or_empty<T, E: Display>(what: &str, result: Result<Vec<T>, E>) -> Vec<T> {
  result.unwrap_or_else(|e| {
    tracing::warn!(query = what, error = %e, "dashboard query failed, counting it as empty");
    Vec::new()
  })
}

/// Aggregate the month of `today`. The three queries run concurrently; one
/// that fails counts as empty.
pub async fn monthly_metrics<S: PantryStore>(store: &S, today: NaiveDate) -> MonthlyMetrics {
  let (from, until) = month_bounds(today);
  let horizon = today.checked_add_days(Days::new(EXPIRY_WINDOW_DAYS)).unwrap_or(NaiveDate::MAX);

  let (delivered, entered, expiring) = tokio::join!(
    store.movements_delivered_between(from, until),
    store.items_created_between(from, until),
    store.items_expiring_by(horizon),
  );
  let delivered = or_empty("movements delivered", delivered);
  let entered = or_empty("items received", entered);
  let expiring = or_empty("items expiring", expiring);

  MonthlyMetrics {
    baskets_delivered:    delivered.len(),
    beneficiaries_served: delivered.iter().map(|m| m.beneficiary_id).collect::<HashSet<_>>().len(),
    entries_this_month:   entered.len(),
    items_expiring_soon:  expiring.len(),
  }
}

/// `GET /dashboard/metrics`
pub async fn metrics<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
) -> Json<MonthlyMetrics> {
  Json(monthly_metrics(state.store.as_ref(), Utc::now().date_naive()).await)
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
  pub limit: Option<usize>,
}

impl RecentParams {
  fn limit(&self) -> usize { self.limit.unwrap_or(DEFAULT_RECENT).min(MAX_RECENT) }
}

/// `GET /dashboard/recent-entries`
pub async fn recent_entries<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Query(params): Query<RecentParams>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
  let items = state
    .store
    .recent_items(params.limit())
    .await
    .map_err(ApiError::backend)?;
  Ok(Json(items))
}

/// `GET /dashboard/recent-exits`
pub async fn recent_exits<B: Backend>(
  State(state): State<AppState<B>>,
  _user: CurrentUser,
  Query(params): Query<RecentParams>,
) -> Result<Json<Vec<MovementView>>, ApiError> {
  let movements = state
    .store
    .recent_movements(params.limit())
    .await
    .map_err(ApiError::backend)?;
  Ok(Json(movements))
}

#[cfg(test)]
mod tests {
  use pantry_core::{
    Error,
    beneficiary::{Beneficiary, BeneficiaryPatch, NewBeneficiary},
    inventory::{InventoryPatch, ItemCategory, NewInventoryItem},
    movement::{DonationMovement, NewMovement},
    profile::{Profile, Role},
    store::{BeneficiaryFilter, InventoryFilter, MovementFilter},
    webhook::{NewWebhookConfig, WebhookConfig, WebhookSource},
  };
  use uuid::Uuid;

  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  // ─── Store double ──────────────────────────────────────────────────────

  /// Answers the three dashboard queries from memory; the expiry query can
  /// be made to fail. Nothing else is ever called.
  #[derive(Default)]
  struct Canned {
    delivered:       Vec<DonationMovement>,
    entered:         Vec<InventoryItem>,
    expiring:        Vec<InventoryItem>,
    expiry_offline:  bool,
    expiry_asked_by: std::sync::Mutex<Option<NaiveDate>>,
  }

  fn movement(beneficiary_id: Uuid) -> DonationMovement {
    DonationMovement {
      id: Uuid::new_v4(),
      beneficiary_id,
      items: Vec::new(),
      delivered_at: Utc::now(),
      evidence_photo_url: None,
      delivered_by: Uuid::new_v4(),
      created_at: Utc::now(),
    }
  }

  fn item(name: &str) -> InventoryItem {
    InventoryItem {
      id:            Uuid::new_v4(),
      created_at:    Utc::now(),
      item_name:     name.into(),
      category:      ItemCategory::Food,
      quantity:      1,
      donor_name:    None,
      received_date: Utc::now().date_naive(),
      expiry_date:   None,
      photo_url:     None,
      created_by:    Uuid::new_v4(),
    }
  }

  impl WebhookSource for Canned {
    type Error = Error;

    async fn active_webhooks(&self, _: &str) -> Result<Vec<WebhookConfig>, Error> {
      unreachable!()
    }
  }

  impl PantryStore for Canned {
    async fn list_items(&self, _: &InventoryFilter) -> Result<Vec<InventoryItem>, Error> {
      unreachable!()
    }
    async fn get_item(&self, _: Uuid) -> Result<Option<InventoryItem>, Error> { unreachable!() }
    async fn create_item(&self, _: NewInventoryItem) -> Result<InventoryItem, Error> {
      unreachable!()
    }
    async fn update_item(&self, _: Uuid, _: InventoryPatch) -> Result<InventoryItem, Error> {
      unreachable!()
    }
    async fn delete_item(&self, _: Uuid) -> Result<(), Error> { unreachable!() }
    async fn available_stock(&self) -> Result<Vec<InventoryItem>, Error> { unreachable!() }
    async fn recent_items(&self, _: usize) -> Result<Vec<InventoryItem>, Error> { unreachable!() }

    async fn items_created_between(
      &self,
      _: DateTime<Utc>,
      _: DateTime<Utc>,
    ) -> Result<Vec<InventoryItem>, Error> {
      Ok(self.entered.clone())
    }

    async fn items_expiring_by(&self, date: NaiveDate) -> Result<Vec<InventoryItem>, Error> {
      *self.expiry_asked_by.lock().unwrap() = Some(date);
      if self.expiry_offline {
        return Err(Error::InvalidUrl("store offline".into()));
      }
      Ok(self.expiring.clone())
    }

    async fn list_beneficiaries(&self, _: &BeneficiaryFilter) -> Result<Vec<Beneficiary>, Error> {
      unreachable!()
    }
    async fn get_beneficiary(&self, _: Uuid) -> Result<Option<Beneficiary>, Error> {
      unreachable!()
    }
    async fn create_beneficiary(&self, _: NewBeneficiary) -> Result<Beneficiary, Error> {
      unreachable!()
    }
    async fn update_beneficiary(&self, _: Uuid, _: BeneficiaryPatch) -> Result<Beneficiary, Error> {
      unreachable!()
    }
    async fn delete_beneficiary(&self, _: Uuid) -> Result<(), Error> { unreachable!() }
    async fn active_beneficiaries(&self) -> Result<Vec<Beneficiary>, Error> { unreachable!() }
    async fn list_movements(&self, _: &MovementFilter) -> Result<Vec<MovementView>, Error> {
      unreachable!()
    }
    async fn create_movement(&self, _: NewMovement) -> Result<DonationMovement, Error> {
      unreachable!()
    }
    async fn delete_movement(&self, _: Uuid) -> Result<(), Error> { unreachable!() }
    async fn recent_movements(&self, _: usize) -> Result<Vec<MovementView>, Error> {
      unreachable!()
    }

    async fn movements_delivered_between(
      &self,
      _: DateTime<Utc>,
      _: DateTime<Utc>,
    ) -> Result<Vec<DonationMovement>, Error> {
      Ok(self.delivered.clone())
    }

    async fn list_webhooks(&self) -> Result<Vec<WebhookConfig>, Error> { unreachable!() }
    async fn create_webhook(&self, _: NewWebhookConfig) -> Result<WebhookConfig, Error> {
      unreachable!()
    }
    async fn set_webhook_active(&self, _: Uuid, _: bool) -> Result<WebhookConfig, Error> {
      unreachable!()
    }
    async fn delete_webhook(&self, _: Uuid) -> Result<(), Error> { unreachable!() }
    async fn get_profile(&self, _: Uuid) -> Result<Option<Profile>, Error> { unreachable!() }
    async fn list_profiles(&self) -> Result<Vec<Profile>, Error> { unreachable!() }
    async fn set_role(&self, _: Uuid, _: Role) -> Result<Profile, Error> { unreachable!() }
  }

  #[tokio::test]
  async fn counts_distinct_beneficiaries() {
    let family = Uuid::new_v4();
    let store = Canned {
      delivered: vec![movement(family), movement(family), movement(Uuid::new_v4())],
      entered: vec![item("Rice"), item("Beans")],
      expiring: vec![item("Milk")],
      ..Default::default()
    };

    let metrics = monthly_metrics(&store, day(2026, 3, 18)).await;
    assert_eq!(
      metrics,
      MonthlyMetrics {
        baskets_delivered:    3,
        beneficiaries_served: 2,
        entries_this_month:   2,
        items_expiring_soon:  1,
      }
    );
    assert_eq!(*store.expiry_asked_by.lock().unwrap(), Some(day(2026, 3, 25)));
  }

  #[tokio::test]
  async fn a_failed_query_counts_as_empty() {
    let store = Canned {
      delivered: vec![movement(Uuid::new_v4())],
      entered: vec![item("Rice")],
      expiring: vec![item("Milk")],
      expiry_offline: true,
      ..Default::default()
    };

    let metrics = monthly_metrics(&store, day(2026, 3, 18)).await;
    assert_eq!(metrics.items_expiring_soon, 0);
    assert_eq!(metrics.baskets_delivered, 1);
    assert_eq!(metrics.beneficiaries_served, 1);
    assert_eq!(metrics.entries_this_month, 1);
  }

  #[test]
  fn month_bounds_cover_the_calendar_month() {
    let (from, until) = month_bounds(day(2026, 3, 18));
    assert_eq!(from.to_rfc3339(), "2026-03-01T00:00:00+00:00");
    assert_eq!(until.to_rfc3339(), "2026-04-01T00:00:00+00:00");
  }

  #[test]
  fn month_bounds_roll_over_the_year() {
    let (from, until) = month_bounds(day(2026, 12, 31));
    assert_eq!(from.date_naive(), day(2026, 12, 1));
    assert_eq!(until.date_naive(), day(2027, 1, 1));
  }

  #[test]
  fn recent_limit_is_bounded() {
    assert_eq!(RecentParams { limit: None }.limit(), 5);
    assert_eq!(RecentParams { limit: Some(500) }.limit(), 50);
  }
}
