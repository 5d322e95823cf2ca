//! Profiles: the application-side record of an authenticated user.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  #[default]
  Member,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Member => "member",
    }
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Self::Admin),
      "member" => Ok(Self::Member),
      other => Err(Error::UnknownVariant { kind: "role", value: other.to_owned() }),
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Created on sign-up; `id` is the auth user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub id:         Uuid,
  pub full_name:  String,
  pub role:       Role,
  pub avatar_url: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Profile {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}
