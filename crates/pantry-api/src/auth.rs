//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/sign-up` | Body: `{email, password, full_name}`; 201 + [`AuthState`] |
//! | `POST` | `/auth/sign-in` | Body: `{email, password}` |
//! | `POST` | `/auth/magic-link` | Body: `{email}`; 202 |
//! | `POST` | `/auth/magic-link/verify` | Body: `{token}` |
//! | `POST` | `/auth/sign-out` | Bearer token required; 204 |
//! | `GET`  | `/auth/session` | The caller's session and profile |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use pantry_core::{
  auth::{AuthProvider, Credentials, Session, SignUp},
  store::PantryStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Backend, CurrentUser, error::ApiError, extract::Json, session::AuthState};

/// Attach the profile to a fresh session and cache both.
async fn establish<B: Backend>(
  state: &AppState<B>,
  session: Session,
) -> Result<AuthState, ApiError> {
  let profile = state
    .store
    .get_profile(session.user_id)
    .await
    .map_err(ApiError::backend)?
    .ok_or_else(|| ApiError::Unauthorized("no profile for this account".into()))?;

  let auth = AuthState { session, profile };
  state.sessions.establish(auth.clone());
  Ok(auth)
}

/// `POST /auth/sign-up`
pub async fn sign_up<B: Backend>(
  State(state): State<AppState<B>>,
  Json(body): Json<SignUp>,
) -> Result<impl IntoResponse, ApiError> {
  let session = state.auth.sign_up(body).await.map_err(ApiError::backend)?;
  let auth = establish(&state, session).await?;
  Ok((StatusCode::CREATED, Json(auth)))
}

/// `POST /auth/sign-in`
pub async fn sign_in<B: Backend>(
  State(state): State<AppState<B>>,
  Json(body): Json<Credentials>,
) -> Result<Json<AuthState>, ApiError> {
  let session = state
    .auth
    .sign_in_with_password(body)
    .await
    .map_err(ApiError::backend)?;
  Ok(Json(establish(&state, session).await?))
}

#[derive(Debug, Deserialize)]
pub struct MagicLinkBody {
  pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MagicLinkIssued {
  pub email:      String,
  pub expires_at: DateTime<Utc>,
}

/// `POST /auth/magic-link`
///
/// The token itself never appears in the response; it goes to the log, which
/// stands in for the mail channel.
pub async fn request_magic_link<B: Backend>(
  State(state): State<AppState<B>>,
  Json(body): Json<MagicLinkBody>,
) -> Result<impl IntoResponse, ApiError> {
  let link = state
    .auth
    .request_magic_link(body.email)
    .await
    .map_err(ApiError::backend)?;

  tracing::info!(email = %link.email, token = %link.token, "magic link issued");
  Ok((
    StatusCode::ACCEPTED,
    Json(MagicLinkIssued { email: link.email, expires_at: link.expires_at }),
  ))
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub token: String,
}

/// `POST /auth/magic-link/verify`
pub async fn verify_magic_link<B: Backend>(
  State(state): State<AppState<B>>,
  Json(body): Json<VerifyBody>,
) -> Result<Json<AuthState>, ApiError> {
  let session = state
    .auth
    .verify_magic_link(body.token)
    .await
    .map_err(ApiError::backend)?;
  Ok(Json(establish(&state, session).await?))
}

/// `POST /auth/sign-out`
pub async fn sign_out<B: Backend>(
  State(state): State<AppState<B>>,
  CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
  let token = user.session.access_token;
  state.sessions.clear(&token);
  state.auth.sign_out(token).await.map_err(ApiError::backend)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/session`
pub async fn current<B: Backend>(CurrentUser(user): CurrentUser) -> Json<AuthState> { Json(user) }
