//! Server configuration.

use std::path::PathBuf;

use pantry_core::webhook::EventNames;
use serde::Deserialize;

/// Everything `pantry-server` reads from `config.toml` and `PANTRY_*`
/// variables. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// Uploaded files are written here and served under `/files`.
  pub storage_dir:          PathBuf,
  /// Prefix of the URLs handed out for uploaded files.
  pub public_base_url:      String,
  pub webhook_timeout_secs: u64,
  pub event_names:          EventNames,
  pub session_ttl_hours:    i64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_owned(),
      port:                 8080,
      store_path:           PathBuf::from("~/.local/share/pantry/pantry.db"),
      storage_dir:          PathBuf::from("~/.local/share/pantry/files"),
      public_base_url:      "http://127.0.0.1:8080/files".to_owned(),
      webhook_timeout_secs: 5,
      event_names:          EventNames::default(),
      session_ttl_hours:    7 * 24,
    }
  }
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.webhook_timeout_secs, 5);
    assert_eq!(cfg.session_ttl_hours, 168);
    assert_eq!(cfg.event_names, EventNames::default());
  }

  #[test]
  fn event_names_can_be_renamed() {
    let cfg = parse(
      r#"
        port = 9000
        [event_names]
        received  = "doacao_recebida"
        delivered = "doacao_entregue"
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.event_names.received, "doacao_recebida");
    assert_eq!(cfg.event_names.delivered, "doacao_entregue");
  }
}
