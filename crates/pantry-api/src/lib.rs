//! JSON REST API for Pantry.
//!
//! Exposes an axum [`Router`] backed by any [`Backend`]: a [`PantryStore`],
//! an [`AuthProvider`] and a [`FileStorage`]. TLS and process concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = pantry_api::router(state, storage_dir);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod beneficiaries;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod movements;
pub mod session;
pub mod uploads;
pub mod users;
pub mod webhooks;


use std::{path::Path, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, patch, post},
};
use pantry_core::{auth::AuthProvider, storage::FileStorage, store::PantryStore};
use pantry_webhook::Dispatcher;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use error::ApiError;
pub use session::{AdminUser, AuthState, CurrentUser, SessionContext};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// The services a deployment plugs into the API.
pub trait Backend: Send + Sync + 'static {
  type Store: PantryStore + 'static;
  type Auth: AuthProvider + 'static;
  type Files: FileStorage + 'static;
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<B: Backend> {
  pub store:      Arc<B::Store>,
  pub auth:       Arc<B::Auth>,
  pub files:      Arc<B::Files>,
  pub dispatcher: Dispatcher<B::Store>,
  pub sessions:   SessionContext,
}

impl<B: Backend> Clone for AppState<B> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      auth:       Arc::clone(&self.auth),
      files:      Arc::clone(&self.files),
      dispatcher: self.dispatcher.clone(),
      sessions:   self.sessions.clone(),
    }
  }
}

impl<B: Backend> AppState<B> {
  /// State with a dispatcher reading subscribers from `store` and an empty
  /// session context.
  pub fn new(store: Arc<B::Store>, auth: Arc<B::Auth>, files: Arc<B::Files>) -> Self {
    Self {
      dispatcher: Dispatcher::new(Arc::clone(&store)),
      store,
      auth,
      files,
      sessions: SessionContext::new(),
    }
  }

  pub fn with_dispatcher(mut self, dispatcher: Dispatcher<B::Store>) -> Self {
    self.dispatcher = dispatcher;
    self
  }
}

// ─── Routers ──────────────────────────────────────────────────────────────────

/// The JSON API, meant to be nested under `/api`.
pub fn api_router<B: Backend>(state: AppState<B>) -> Router<()> {
  Router::new()
    // Auth
    .route("/auth/sign-up", post(auth::sign_up::<B>))
    .route("/auth/sign-in", post(auth::sign_in::<B>))
    .route("/auth/magic-link", post(auth::request_magic_link::<B>))
    .route("/auth/magic-link/verify", post(auth::verify_magic_link::<B>))
    .route("/auth/sign-out", post(auth::sign_out::<B>))
    .route("/auth/session", get(auth::current::<B>))
    // Inventory
    .route("/inventory", get(inventory::list::<B>).post(inventory::create::<B>))
    .route("/inventory/available", get(inventory::available::<B>))
    .route(
      "/inventory/{id}",
      get(inventory::get_one::<B>)
        .patch(inventory::update::<B>)
        .delete(inventory::remove::<B>),
    )
    // Beneficiaries
    .route(
      "/beneficiaries",
      get(beneficiaries::list::<B>).post(beneficiaries::create::<B>),
    )
    .route("/beneficiaries/active", get(beneficiaries::active::<B>))
    .route(
      "/beneficiaries/{id}",
      get(beneficiaries::get_one::<B>)
        .patch(beneficiaries::update::<B>)
        .delete(beneficiaries::remove::<B>),
    )
    // Movements
    .route("/movements", get(movements::list::<B>).post(movements::create::<B>))
    .route("/movements/{id}", delete(movements::remove::<B>))
    // Dashboard
    .route("/dashboard/metrics", get(dashboard::metrics::<B>))
    .route("/dashboard/recent-entries", get(dashboard::recent_entries::<B>))
    .route("/dashboard/recent-exits", get(dashboard::recent_exits::<B>))
    // Uploads
    .route(
      "/uploads",
      post(uploads::upload::<B>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
    // Webhooks
    .route("/webhooks", get(webhooks::list::<B>).post(webhooks::create::<B>))
    .route(
      "/webhooks/{id}",
      patch(webhooks::update::<B>).delete(webhooks::remove::<B>),
    )
    // Users
    .route("/users", get(users::list::<B>))
    .route("/users/{id}/role", patch(users::set_role::<B>))
    .with_state(state)
}

/// The whole application: the API under `/api`, stored files under `/files`,
/// every request traced.
pub fn router<B: Backend>(state: AppState<B>, files_root: impl AsRef<Path>) -> Router<()> {
  Router::new()
    .nest("/api", api_router(state))
    .nest_service("/files", ServeDir::new(files_root.as_ref()))
    .layer(TraceLayer::new_for_http())
}
