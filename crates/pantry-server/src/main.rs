//! pantry-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `PANTRY_*`
//! environment variables, opens the SQLite store, and serves the JSON API
//! under `/api` and uploaded files under `/files`.
//!
//! # Granting the first admin
//!
//! Users sign up as members. To promote one:
//!
//! ```sh
//! cargo run -p pantry-server -- --grant-admin ana@example.org
//! ```
//!
//! This writes the role straight to the database. A server that is already
//! running keeps serving the cached profile for sessions it has seen, so the
//! user has to sign in again (or the server be restarted) before the new role
//! applies. Role changes made through `PATCH /api/users/{id}/role` take effect
//! immediately.

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use chrono::TimeDelta;
use clap::Parser;
use pantry_api::{AppState, Backend};
use pantry_core::{auth::AuthProvider, profile::Role, store::PantryStore};
use pantry_store_sqlite::{LocalFileStorage, SqliteStore};
use pantry_webhook::Dispatcher;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Pantry donation management server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Give the admin role to the user registered with this e-mail and exit.
  /// Running servers pick it up at the user's next sign-in.
  #[arg(long, value_name = "EMAIL")]
  grant_admin: Option<String>,
}

struct Sqlite;

impl Backend for Sqlite {
  type Store = SqliteStore;
  type Auth = SqliteStore;
  type Files = LocalFileStorage;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("PANTRY")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_session_ttl(TimeDelta::hours(server_cfg.session_ttl_hours));
  let store = Arc::new(store);

  if let Some(email) = cli.grant_admin {
    return grant_admin(&store, email).await;
  }

  let storage_dir = expand_tilde(&server_cfg.storage_dir);
  std::fs::create_dir_all(&storage_dir)
    .with_context(|| format!("failed to create {storage_dir:?}"))?;
  let files = LocalFileStorage::new(&storage_dir, server_cfg.public_base_url.clone());

  let dispatcher = Dispatcher::new(Arc::clone(&store))
    .with_timeout(Duration::from_secs(server_cfg.webhook_timeout_secs))
    .with_event_names(server_cfg.event_names.clone());

  let state = AppState::<Sqlite>::new(Arc::clone(&store), store, Arc::new(files))
    .with_dispatcher(dispatcher);

  let app = pantry_api::router(state, &storage_dir);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn grant_admin(store: &SqliteStore, email: String) -> anyhow::Result<()> {
  let id = store
    .find_user_by_email(email.clone())
    .await
    .context("failed to look up user")?
    .with_context(|| format!("no user registered with {email}"))?;

  let profile = store.set_role(id, Role::Admin).await.context("failed to update role")?;
  tracing::info!(user = %profile.id, %email, "granted admin role");
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
