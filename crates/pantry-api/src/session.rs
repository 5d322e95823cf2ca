//! Who is signed in, and the extractors that enforce it.
//!
//! [`SessionContext`] caches the session and profile of every bearer token
//! seen by this process. It holds an immutable [`AuthSnapshot`] behind a
//! [`tokio::sync::watch`] channel: each sign-in, sign-out or role change
//! builds a new snapshot and swaps it in, so readers always see one
//! consistent value. Cache misses fall back to the [`AuthProvider`].

use std::{collections::HashMap, ops::Deref, sync::Arc};

use axum::{
  extract::FromRequestParts,
  http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use pantry_core::{
  auth::{AuthProvider, Session},
  profile::Profile,
  store::PantryStore,
};
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use tokio::sync::watch;

use crate::{AppState, Backend, error::ApiError};

/// An established session together with its owner's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthState {
  pub session: Session,
  pub profile: Profile,
}

/// Token digest -> state.
pub type AuthSnapshot = HashMap<String, AuthState>;

fn digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

#[derive(Clone)]
pub struct SessionContext {
  tx: Arc<watch::Sender<Arc<AuthSnapshot>>>,
}

impl Default for SessionContext {
  fn default() -> Self { Self::new() }
}

impl SessionContext {
  pub fn new() -> Self {
    let (tx, _) = watch::channel(Arc::new(AuthSnapshot::new()));
    Self { tx: Arc::new(tx) }
  }

  /// The current snapshot. Later changes never mutate it.
  pub fn snapshot(&self) -> Arc<AuthSnapshot> { Arc::clone(&self.tx.borrow()) }

  /// Notified on every transition.
  pub fn subscribe(&self) -> watch::Receiver<Arc<AuthSnapshot>> { self.tx.subscribe() }

  /// The cached, unexpired state for `token`.
  pub fn lookup(&self, token: &str) -> Option<AuthState> {
    self
      .snapshot()
      .get(&digest(token))
      .filter(|state| !state.session.is_expired(Utc::now()))
      .cloned()
  }

  pub fn establish(&self, state: AuthState) {
    let key = digest(&state.session.access_token);
    self.replace(|next| {
      next.insert(key, state);
    });
  }

  pub fn clear(&self, token: &str) {
    let key = digest(token);
    self.replace(|next| {
      next.remove(&key);
    });
  }

  /// Swap in `profile` for every live session of its user.
  pub fn update_profile(&self, profile: &Profile) {
    self.replace(|next| {
      for state in next.values_mut().filter(|s| s.profile.id == profile.id) {
        state.profile = profile.clone();
      }
    });
  }

  fn replace(&self, change: impl FnOnce(&mut AuthSnapshot)) {
    self.tx.send_modify(|current| {
      let now = Utc::now();
      let mut next: AuthSnapshot = current
        .iter()
        .filter(|(_, state)| !state.session.is_expired(now))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
      change(&mut next);
      *current = Arc::new(next);
    });
  }
}

// ─── Extractors ──────────────────────────────────────────────────────────────

fn bearer_token(parts: &Parts) -> Option<&str> {
  parts
    .headers
    .get(AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

/// Any signed-in user. Rejects with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthState);

impl Deref for CurrentUser {
  type Target = AuthState;

  fn deref(&self) -> &AuthState { &self.0 }
}

/// A signed-in user with the `admin` role. Rejects with 401 or 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthState);

impl Deref for AdminUser {
  type Target = AuthState;

  fn deref(&self) -> &AuthState { &self.0 }
}

/// Resolve `token` through the cache, falling back to the auth provider and
/// caching what it finds.
pub(crate) async fn resolve<B: Backend>(
  state: &AppState<B>,
  token: &str,
) -> Result<Option<AuthState>, ApiError> {
  if let Some(found) = state.sessions.lookup(token) {
    return Ok(Some(found));
  }

  let Some(session) = state
    .auth
    .get_session(token.to_owned())
    .await
    .map_err(ApiError::backend)?
  else {
    return Ok(None);
  };
  let Some(profile) = state
    .store
    .get_profile(session.user_id)
    .await
    .map_err(ApiError::backend)?
  else {
    return Ok(None);
  };

  let found = AuthState { session, profile };
  state.sessions.establish(found.clone());
  Ok(Some(found))
}

impl<B: Backend> FromRequestParts<AppState<B>> for CurrentUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<B>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(parts)
      .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?
      .to_owned();
    resolve(state, &token)
      .await?
      .map(CurrentUser)
      .ok_or_else(|| ApiError::Unauthorized("invalid or expired session".into()))
  }
}

impl<B: Backend> FromRequestParts<AppState<B>> for AdminUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<B>,
  ) -> Result<Self, Self::Rejection> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
    if !user.profile.is_admin() {
      return Err(ApiError::Forbidden("administrator role required".into()));
    }
    Ok(AdminUser(user))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeDelta;
  use pantry_core::profile::Role;
  use uuid::Uuid;

  use super::*;

  fn state(token: &str, ttl: TimeDelta) -> AuthState {
    let user_id = Uuid::new_v4();
    AuthState {
      session: Session {
        access_token: token.into(),
        user_id,
        email: "ana@example.org".into(),
        expires_at: Utc::now() + ttl,
      },
      profile: Profile {
        id:         user_id,
        full_name:  "Ana".into(),
        role:       Role::Member,
        avatar_url: None,
        created_at: Utc::now(),
      },
    }
  }

  #[test]
  fn snapshots_are_replaced_not_mutated() {
    let ctx = SessionContext::new();
    let before = ctx.snapshot();

    ctx.establish(state("tok-a", TimeDelta::hours(1)));
    assert!(before.is_empty());
    assert_eq!(ctx.snapshot().len(), 1);
    assert!(ctx.lookup("tok-a").is_some());
    assert!(ctx.lookup("tok-b").is_none());

    let held = ctx.snapshot();
    ctx.clear("tok-a");
    assert_eq!(held.len(), 1);
    assert!(ctx.lookup("tok-a").is_none());
  }

  #[test]
  fn expired_entries_are_ignored_and_pruned() {
    let ctx = SessionContext::new();
    ctx.establish(state("old", TimeDelta::seconds(-1)));
    assert!(ctx.lookup("old").is_none());

    ctx.establish(state("new", TimeDelta::hours(1)));
    assert_eq!(ctx.snapshot().len(), 1);
  }

  #[test]
  fn role_changes_reach_every_session_of_the_user() {
    let ctx = SessionContext::new();
    let first = state("one", TimeDelta::hours(1));
    let mut second = state("two", TimeDelta::hours(1));
    second.profile = first.profile.clone();
    second.session.user_id = first.session.user_id;
    ctx.establish(first.clone());
    ctx.establish(second);

    let mut promoted = first.profile.clone();
    promoted.role = Role::Admin;
    ctx.update_profile(&promoted);

    assert!(ctx.lookup("one").unwrap().profile.is_admin());
    assert!(ctx.lookup("two").unwrap().profile.is_admin());
  }

  #[tokio::test]
  async fn subscribers_see_transitions() {
    let ctx = SessionContext::new();
    let mut rx = ctx.subscribe();
    ctx.establish(state("tok", TimeDelta::hours(1)));
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);
  }
}
