//! Core types and trait definitions for the Pantry donation tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod auth;
pub mod beneficiary;
pub mod document;
pub mod error;
pub mod inventory;
pub mod movement;
mod patch;
pub mod profile;
pub mod storage;
pub mod store;
pub mod validate;
pub mod webhook;

pub use error::{Classify, Error, ErrorKind, Result};
