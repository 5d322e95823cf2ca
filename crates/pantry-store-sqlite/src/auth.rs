//! [`AuthProvider`] for [`SqliteStore`]: password and magic-link sign-in
//! over the same database as the inventory.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand_core::{OsRng, RngCore as _};
use rusqlite::OptionalExtension as _;
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use pantry_core::{
  auth::{AuthProvider, Credentials, MagicLink, Session, SignUp},
  profile::Role,
};

use crate::{
  Error, Result,
  encode::{decode_dt, decode_uuid, encode_dt, encode_uuid, now},
  store::SqliteStore,
};

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

/// Trimmed and lower-cased; rejects anything without a `local@domain.tld`
/// shape.
fn normalize_email(email: &str) -> Result<String> {
  let email = email.trim().to_lowercase();
  let valid = match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
        && !email.chars().any(char::is_whitespace)
    }
    None => false,
  };
  if valid { Ok(email) } else { Err(Error::InvalidEmail(email)) }
}

fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

async fn hash_password(password: String) -> Result<String> {
  tokio::task::spawn_blocking(move || {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| Error::PasswordHash(e.to_string()))
  })
  .await
  .map_err(|e| Error::PasswordHash(e.to_string()))?
}

async fn verify_password(password: String, phc: String) -> Result<bool> {
  tokio::task::spawn_blocking(move || {
    let parsed = PasswordHash::new(&phc).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok::<_, Error>(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
  })
  .await
  .map_err(|e| Error::PasswordHash(e.to_string()))?
}

impl SqliteStore {
  async fn open_session(&self, user_id: Uuid, email: String) -> Result<Session> {
    let token      = new_token();
    let now        = now();
    let expires_at = now + self.session_ttl;

    let digest    = token_digest(&token);
    let user_str  = encode_uuid(user_id);
    let now_str   = encode_dt(now);
    let until_str = encode_dt(expires_at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_digest, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![digest, user_str, now_str, until_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(%user_id, "opened session");
    Ok(Session { access_token: token, user_id, email, expires_at })
  }

  /// `(id, email, password_hash)` of the user registered under `email`.
  async fn user_by_email(&self, email: String) -> Result<Option<(Uuid, String, String)>> {
    let row: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, password_hash FROM users WHERE email = ?1",
              rusqlite::params![email],
              |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row.map(|(id, email, hash)| Ok::<_, Error>((decode_uuid(&id)?, email, hash))).transpose()
  }
}

impl AuthProvider for SqliteStore {
  type Error = Error;

  async fn sign_up(&self, input: SignUp) -> Result<Session> {
    let email = normalize_email(&input.email)?;
    if input.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::WeakPassword(MIN_PASSWORD_LEN));
    }
    let phc = hash_password(input.password).await?;

    let user_id   = Uuid::new_v4();
    let user_str  = encode_uuid(user_id);
    let now_str   = encode_dt(now());
    let full_name = input.full_name.trim().to_owned();
    let stored    = email.clone();

    let outcome: Result<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row("SELECT 1 FROM users WHERE email = ?1", rusqlite::params![stored], |_| {
            Ok(())
          })
          .optional()?;
        if taken.is_some() {
          return Ok(Err(Error::EmailTaken(stored)));
        }

        tx.execute(
          "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_str, stored, phc, now_str],
        )?;
        tx.execute(
          "INSERT INTO profiles (id, full_name, role, avatar_url, created_at)
           VALUES (?1, ?2, ?3, NULL, ?4)",
          rusqlite::params![user_str, full_name, Role::Member.as_str(), now_str],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;
    outcome?;

    tracing::info!(%user_id, "registered user");
    self.open_session(user_id, email).await
  }

  async fn sign_in_with_password(&self, credentials: Credentials) -> Result<Session> {
    let email = normalize_email(&credentials.email).map_err(|_| Error::InvalidCredentials)?;
    let Some((user_id, email, phc)) = self.user_by_email(email).await? else {
      return Err(Error::InvalidCredentials);
    };
    if !verify_password(credentials.password, phc).await? {
      return Err(Error::InvalidCredentials);
    }
    self.open_session(user_id, email).await
  }

  async fn request_magic_link(&self, email: String) -> Result<MagicLink> {
    let email = normalize_email(&email)?;
    let Some((user_id, email, _)) = self.user_by_email(email.clone()).await? else {
      return Err(Error::not_found("user", email));
    };

    let token      = new_token();
    let expires_at = now() + self.magic_link_ttl;

    let digest    = token_digest(&token);
    let user_str  = encode_uuid(user_id);
    let until_str = encode_dt(expires_at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO magic_links (token_digest, user_id, expires_at, used_at)
           VALUES (?1, ?2, ?3, NULL)",
          rusqlite::params![digest, user_str, until_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(MagicLink { email, token, expires_at })
  }

  async fn verify_magic_link(&self, token: String) -> Result<Session> {
    let digest  = token_digest(&token);
    let now     = now();
    let now_str = encode_dt(now);

    // Claim the link and read its owner in one transaction so a token can
    // only ever be redeemed once.
    let claimed: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let row = tx
          .query_row(
            "SELECT l.user_id, l.expires_at, u.email
             FROM magic_links l JOIN users u ON u.id = l.user_id
             WHERE l.token_digest = ?1 AND l.used_at IS NULL",
            rusqlite::params![digest],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;
        if row.is_some() {
          tx.execute(
            "UPDATE magic_links SET used_at = ?2 WHERE token_digest = ?1",
            rusqlite::params![digest, now_str],
          )?;
        }
        tx.commit()?;
        Ok(row)
      })
      .await?;

    let Some((user_str, expires_str, email)) = claimed else {
      return Err(Error::InvalidToken);
    };
    if decode_dt(&expires_str)? <= now {
      return Err(Error::InvalidToken);
    }
    self.open_session(decode_uuid(&user_str)?, email).await
  }

  async fn get_session(&self, token: String) -> Result<Option<Session>> {
    let digest = token_digest(&token);
    let row: Option<(String, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT s.user_id, s.expires_at, u.email
               FROM sessions s JOIN users u ON u.id = s.user_id
               WHERE s.token_digest = ?1",
              rusqlite::params![digest],
              |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((user_str, expires_str, email)) = row else {
      return Ok(None);
    };
    let session = Session {
      access_token: token,
      user_id: decode_uuid(&user_str)?,
      email,
      expires_at: decode_dt(&expires_str)?,
    };
    Ok((!session.is_expired(now())).then_some(session))
  }

  async fn sign_out(&self, token: String) -> Result<()> {
    let digest = token_digest(&token);
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM sessions WHERE token_digest = ?1", rusqlite::params![digest])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_user_by_email(&self, email: String) -> Result<Option<Uuid>> {
    let Ok(email) = normalize_email(&email) else {
      return Ok(None);
    };
    Ok(self.user_by_email(email).await?.map(|(id, ..)| id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emails_are_normalized() {
    assert_eq!(normalize_email("  Ana@Example.ORG ").unwrap(), "ana@example.org");
    assert!(normalize_email("ana").is_err());
    assert!(normalize_email("@example.org").is_err());
    assert!(normalize_email("ana@example").is_err());
    assert!(normalize_email("ana@@example.org").is_err());
    assert!(normalize_email("ana@example..org").is_err());
  }

  #[test]
  fn tokens_are_random_and_digests_stable() {
    let a = new_token();
    let b = new_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 43);
    assert_eq!(token_digest(&a), token_digest(&a));
    assert_eq!(token_digest("abc").len(), 64);
  }
}
