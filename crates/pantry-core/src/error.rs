//! Error types for `pantry-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown {kind} value: {value:?}")]
  UnknownVariant { kind: &'static str, value: String },

  #[error("invalid {kind} document: {value:?}")]
  InvalidDocument { kind: &'static str, value: String },

  #[error("line for item {0} has a zero quantity")]
  ZeroQuantity(uuid::Uuid),

  #[error("invalid webhook url: {0:?}")]
  InvalidUrl(String),

  #[error("a movement needs at least one line item")]
  EmptyMovement,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse category of a backend failure, used by callers that only need to
/// decide how to react (e.g. which HTTP status to answer with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The addressed record does not exist.
  NotFound,
  /// The input was rejected (validation, insufficient stock, ...).
  Invalid,
  /// The write collides with existing data (duplicate e-mail, referenced row).
  Conflict,
  /// Bad credentials or an unknown/expired token.
  Unauthorized,
  /// Anything else: I/O, database, corrupt rows.
  Internal,
}

/// Implemented by backend error types so that higher layers can classify
/// them without knowing the concrete type.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Serialization(_) => ErrorKind::Internal,
      _ => ErrorKind::Invalid,
    }
  }
}
