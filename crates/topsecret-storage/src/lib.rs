// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the TopSecret vault.
//!
//! A single `secure_store` key/value table behind the [`SecureStore`] trait,
//! with embedded migrations and all access funnelled through
//! `tokio-rusqlite`'s background thread.
//!
//! [`SecureStore`]: topsecret_core::SecureStore

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteSecureStore;
