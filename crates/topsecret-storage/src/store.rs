// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`SecureStore`] trait.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use topsecret_config::model::StorageConfig;
use topsecret_core::{SecureStore, TopSecretError};

use crate::database::{Database, map_tr_err};

/// Key/value secure store kept in the `secure_store` table.
///
/// Values are stored exactly as handed over; encryption happens above this
/// layer.
#[derive(Clone)]
pub struct SqliteSecureStore {
    db: Database,
}

impl SqliteSecureStore {
    /// Wrap an already opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database named by `storage.database_path`.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, TopSecretError> {
        Database::open(&config.database_path).await.map(Self::new)
    }

    /// In-memory store, mostly for tests.
    pub async fn in_memory() -> Result<Self, TopSecretError> {
        Database::open_in_memory().await.map(Self::new)
    }

    /// Number of stored entries.
    pub async fn len(&self) -> Result<usize, TopSecretError> {
        self.db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM secure_store", [], |row| row.get(0))
            })
            .await
            .map(|n| usize::try_from(n).unwrap_or_default())
            .map_err(map_tr_err)
    }

    pub async fn is_empty(&self) -> Result<bool, TopSecretError> {
        Ok(self.len().await? == 0)
    }
}

#[async_trait]
impl SecureStore for SqliteSecureStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TopSecretError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT value FROM secure_store WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), TopSecretError> {
        let key = key.to_string();
        let value = value.to_string();
        let log_key = key.clone();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO secure_store (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key = %log_key, "secure store entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), TopSecretError> {
        let key = key.to_string();
        let removed = self
            .db
            .connection()
            .call({
                let key = key.clone();
                move |conn| conn.execute("DELETE FROM secure_store WHERE key = ?1", params![key])
            })
            .await
            .map_err(map_tr_err)?;
        debug!(key = %key, removed, "secure store entry removed");
        Ok(())
    }
}
