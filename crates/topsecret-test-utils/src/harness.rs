// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end vault tests.
//!
//! `TestHarness` owns one secure store (in memory, or SQLite in a temp dir)
//! and hands out fresh [`Vault`] instances over it. Each call to
//! [`TestHarness::open_vault`] behaves like a new process start against the
//! same device storage.

use std::sync::Arc;

use topsecret_config::TopSecretConfig;
use topsecret_core::{SecureStore, TopSecretError};
use topsecret_storage::SqliteSecureStore;
use topsecret_vault::{MasterPasswordGate, Vault};

use crate::memory_store::MemoryStore;

/// Iteration count used by tests. Far below the production minimum.
pub const TEST_KDF_ITERATIONS: u32 = 1_000;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    device_id: String,
    max_failed_attempts: Option<u32>,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            device_id: "test-device".to_string(),
            max_failed_attempts: None,
            sqlite: false,
        }
    }

    /// Device identifier mixed into key derivation.
    pub fn with_device_id(mut self, device_id: &str) -> Self {
        self.device_id = device_id.to_string();
        self
    }

    /// Failed logins tolerated before the gate wipes the vault.
    pub fn with_max_failed_attempts(mut self, max: u32) -> Self {
        self.max_failed_attempts = Some(max);
        self
    }

    /// Back the vault with a SQLite file in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub async fn build(self) -> Result<TestHarness, TopSecretError> {
        let mut config = TopSecretConfig::default();
        config.crypto.kdf_iterations = TEST_KDF_ITERATIONS;
        config.device.identifier = Some(self.device_id);
        if let Some(max) = self.max_failed_attempts {
            config.login.max_failed_attempts = max;
        }

        let memory = MemoryStore::new();
        let mut temp_dir = None;
        let store: Arc<dyn SecureStore> = if self.sqlite {
            let dir =
                tempfile::TempDir::new().map_err(|e| TopSecretError::Storage { source: e.into() })?;
            config.storage.database_path =
                dir.path().join("vault.db").to_string_lossy().into_owned();
            temp_dir = Some(dir);
            Arc::new(SqliteSecureStore::from_config(&config.storage).await?)
        } else {
            Arc::new(memory.clone())
        };

        Ok(TestHarness {
            store,
            memory,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A shared secure store plus the configuration to open vaults over it.
pub struct TestHarness {
    store: Arc<dyn SecureStore>,
    /// Unused by SQLite-backed harnesses.
    memory: MemoryStore,
    config: TopSecretConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// In-memory harness with default settings.
    pub async fn new() -> Result<Self, TopSecretError> {
        Self::builder().build().await
    }

    /// A fresh, locked vault over the shared store.
    pub fn open_vault(&self) -> Result<Vault, TopSecretError> {
        Vault::from_config(Arc::clone(&self.store), &self.config)
    }

    pub fn gate(&self) -> MasterPasswordGate {
        MasterPasswordGate::from_config(&self.config.login)
    }

    /// Open a vault and log in with `password`, bootstrapping it on first use.
    pub async fn unlocked_vault(&self, password: &str) -> Result<Vault, TopSecretError> {
        let mut vault = self.open_vault()?;
        if !self.gate().verify(&mut vault, password).await? {
            return Err(TopSecretError::InvalidArgument(
                "wrong master password for test vault".to_string(),
            ));
        }
        vault.populate_records().await?;
        Ok(vault)
    }

    pub fn store(&self) -> Arc<dyn SecureStore> {
        Arc::clone(&self.store)
    }

    /// The in-memory store, for failure injection and raw inspection.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn config(&self) -> &TopSecretConfig {
        &self.config
    }
}
