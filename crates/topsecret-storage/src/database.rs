// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread. Do NOT
//! open a second connection to the same file for writes.

use std::path::Path;

use topsecret_core::TopSecretError;
use tracing::debug;

use crate::migrations::run_migrations;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA busy_timeout = 5000;";

/// An open, migrated SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database file at `path`.
    ///
    /// Missing parent directories are created. PRAGMAs and migrations are
    /// applied before the handle is returned.
    pub async fn open(path: &str) -> Result<Self, TopSecretError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| TopSecretError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| TopSecretError::Storage {
                source: Box::new(e),
            })?;
        let db = Self::prepare(conn).await?;
        debug!(path, "secure store database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Contents vanish on drop.
    pub async fn open_in_memory() -> Result<Self, TopSecretError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| TopSecretError::Storage {
                source: Box::new(e),
            })?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: tokio_rusqlite::Connection) -> Result<Self, TopSecretError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(run_migrations)
            .await
            .map_err(|e| TopSecretError::Storage {
                source: format!("migration failed: {e}").into(),
            })?;

        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

/// Convert a tokio-rusqlite error into `TopSecretError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TopSecretError {
    TopSecretError::Storage {
        source: Box::new(e),
    }
}
