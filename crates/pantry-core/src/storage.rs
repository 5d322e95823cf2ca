//! The file storage interface and object naming.
//!
//! Objects are written under `{folder}/{unix_millis}-{suffix}.{ext}` and are
//! never overwritten.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::Classify;

/// Folder used when the caller does not name one.
pub const DEFAULT_FOLDER: &str = "evidence";

const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 8;

/// A stored object and where the public can fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
  pub path:       String,
  pub public_url: String,
}

pub trait FileStorage: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Store `bytes` under a freshly generated path inside `folder`.
  fn upload<'a>(
    &'a self,
    folder: &'a str,
    original_name: &'a str,
    bytes: Vec<u8>,
  ) -> impl Future<Output = Result<StoredObject, Self::Error>> + Send + 'a;

  fn public_url(&self, path: &str) -> String;
}

/// `true` for a relative folder made of `[A-Za-z0-9_-]` segments joined by
/// `/`. Rejects traversal and absolute paths.
pub fn is_safe_folder(folder: &str) -> bool {
  !folder.is_empty()
    && folder.split('/').all(|seg| {
      !seg.is_empty() && seg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    })
}

/// The lower-cased extension of `original_name`, or `bin` when there is none
/// or it looks suspicious.
pub fn extension_of(original_name: &str) -> String {
  match original_name.rsplit_once('.') {
    Some((_, ext))
      if !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
    {
      ext.to_ascii_lowercase()
    }
    _ => FALLBACK_EXTENSION.to_owned(),
  }
}

/// Render `n` in base 36 (`0-9a-z`).
pub fn base36(mut n: u64) -> String {
  const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  if n == 0 {
    return "0".to_owned();
  }
  let mut out = Vec::new();
  while n > 0 {
    out.push(DIGITS[(n % 36) as usize]);
    n /= 36;
  }
  out.reverse();
  String::from_utf8(out).unwrap_or_default()
}

pub fn object_path(folder: &str, original_name: &str, unix_millis: i64, suffix: &str) -> String {
  format!("{folder}/{unix_millis}-{suffix}.{}", extension_of(original_name))
}
