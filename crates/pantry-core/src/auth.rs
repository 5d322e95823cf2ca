//! The authentication provider interface.
//!
//! Sessions are identified by an opaque bearer token handed to the client
//! exactly once. Providers persist only a digest of it.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Classify;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub access_token: String,
  pub user_id:      Uuid,
  pub email:        String,
  pub expires_at:   DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }
}

/// A one-time passwordless sign-in token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicLink {
  pub email:      String,
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

/// Input to [`AuthProvider::sign_up`].
#[derive(Debug, Clone, Deserialize)]
pub struct SignUp {
  pub email:     String,
  pub password:  String,
  pub full_name: String,
}

/// Abstraction over the authentication backend.
///
/// Signing up also creates the user's [`Profile`](crate::profile::Profile)
/// with the `member` role.
pub trait AuthProvider: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Register a new user and open a session for them.
  fn sign_up(
    &self,
    input: SignUp,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  fn sign_in_with_password(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Issue a one-time token for an existing user. Delivering it (e-mail,
  /// chat, ...) is the caller's concern.
  fn request_magic_link(
    &self,
    email: String,
  ) -> impl Future<Output = Result<MagicLink, Self::Error>> + Send + '_;

  /// Exchange a magic-link token for a session. Tokens are single-use.
  fn verify_magic_link(
    &self,
    token: String,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Look up a live session by bearer token. Expired sessions are `None`.
  fn get_session(
    &self,
    token: String,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  fn sign_out(
    &self,
    token: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn find_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + '_;
}
