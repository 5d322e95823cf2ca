//! SQLite backend for the Pantry store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The same database also backs the
//! [`AuthProvider`](pantry_core::auth::AuthProvider) implementation;
//! uploaded files live on local disk via [`LocalFileStorage`].

mod auth;
mod encode;
mod files;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use files::LocalFileStorage;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
