//! Error type for `pantry-store-sqlite`.

use pantry_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] pantry_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A stored column could not be decoded into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("{entity} not found: {key}")]
  NotFound { entity: &'static str, key: String },

  #[error("item {item_id} has {available} in stock, {requested} requested")]
  InsufficientStock { item_id: uuid::Uuid, requested: u32, available: u32 },

  #[error("e-mail already registered: {0}")]
  EmailTaken(String),

  #[error("password must be at least {0} characters")]
  WeakPassword(usize),

  #[error("invalid e-mail address: {0:?}")]
  InvalidEmail(String),

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("invalid or expired token")]
  InvalidToken,

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("invalid storage folder: {0:?}")]
  InvalidFolder(String),
}

impl Error {
  pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
    Self::NotFound { entity, key: key.to_string() }
  }
}

fn is_constraint_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Database(e) if is_constraint_violation(e) => ErrorKind::Conflict,
      Error::NotFound { .. } => ErrorKind::NotFound,
      Error::InsufficientStock { .. }
      | Error::WeakPassword(_)
      | Error::InvalidEmail(_)
      | Error::InvalidFolder(_) => ErrorKind::Invalid,
      Error::EmailTaken(_) => ErrorKind::Conflict,
      Error::InvalidCredentials | Error::InvalidToken => ErrorKind::Unauthorized,
      Error::Database(_)
      | Error::Json(_)
      | Error::Uuid(_)
      | Error::Io(_)
      | Error::Decode(_)
      | Error::PasswordHash(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
