//! [`FileStorage`] on the local filesystem.

use std::{
  io::ErrorKind as IoErrorKind,
  path::{Path, PathBuf},
};

use chrono::Utc;
use pantry_core::storage::{FileStorage, StoredObject, base36, is_safe_folder, object_path};
use rand_core::{OsRng, RngCore as _};
use tokio::{fs, io::AsyncWriteExt as _};

use crate::{Error, Result};

const SUFFIX_LEN: u32 = 6;
const MAX_ATTEMPTS: usize = 4;

/// Writes uploads beneath `root`; they are served from `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
  root:            PathBuf,
  public_base_url: String,
}

impl LocalFileStorage {
  pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
    Self { root: root.into(), public_base_url: public_base_url.into() }
  }

  pub fn root(&self) -> &Path { &self.root }
}

fn random_suffix() -> String {
  let n = OsRng.next_u64() % 36u64.pow(SUFFIX_LEN);
  format!("{:0>width$}", base36(n), width = SUFFIX_LEN as usize)
}

/// Write `bytes` to the freshly created `file` at `path`. On failure the
/// partial file is removed.
async fn fill(mut file: fs::File, path: &Path, bytes: &[u8]) -> Result<()> {
  let written = match file.write_all(bytes).await {
    Ok(()) => file.flush().await,
    Err(e) => Err(e),
  };
  if let Err(e) = written {
    drop(file);
    if let Err(cleanup) = fs::remove_file(path).await {
      tracing::warn!(path = %path.display(), error = %cleanup, "could not remove partial upload");
    }
    return Err(e.into());
  }
  Ok(())
}

impl FileStorage for LocalFileStorage {
  type Error = Error;

  async fn upload(&self, folder: &str, original_name: &str, bytes: Vec<u8>) -> Result<StoredObject> {
    if !is_safe_folder(folder) {
      return Err(Error::InvalidFolder(folder.to_owned()));
    }
    fs::create_dir_all(self.root.join(folder)).await?;

    let mut attempt = 0;
    loop {
      attempt += 1;
      let path = object_path(folder, original_name, Utc::now().timestamp_millis(), &random_suffix());
      let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(self.root.join(&path))
        .await;

      let file = match file {
        Ok(file) => file,
        Err(e) if e.kind() == IoErrorKind::AlreadyExists && attempt < MAX_ATTEMPTS => continue,
        Err(e) => return Err(e.into()),
      };
      fill(file, &self.root.join(&path), &bytes).await?;

      tracing::debug!(%path, size = bytes.len(), "stored upload");
      return Ok(StoredObject { public_url: self.public_url(&path), path });
    }
  }

  fn public_url(&self, path: &str) -> String {
    format!("{}/{}", self.public_base_url.trim_end_matches('/'), path.trim_start_matches('/'))
  }
}
