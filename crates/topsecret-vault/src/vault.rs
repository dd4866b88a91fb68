// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: load, edit, delete and persist account records, and
//! rotate the master password.
//!
//! The master password is stored as its own ciphertext (encrypted with
//! itself as the key). All records are serialized into a single blob and
//! encrypted with the current master password.

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use topsecret_config::TopSecretConfig;
use topsecret_config::model::StorageConfig;
use topsecret_core::{AccountRecord, SecureStore, TopSecretError};
use tracing::{debug, error, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::channel::StorageChannel;
use crate::cipher::CipherCodec;
use crate::kdf::KdfParams;
use crate::{device, records};

/// Names of the entries the vault keeps in the secure store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub account_data: String,
    pub master_password: String,
    pub failed_attempts: String,
}

impl StorageKeys {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            account_data: config.account_data_key.clone(),
            master_password: config.master_password_key.clone(),
            failed_attempts: config.failed_attempts_key.clone(),
        }
    }

    fn all(&self) -> [&str; 3] {
        [
            self.account_data.as_str(),
            self.master_password.as_str(),
            self.failed_attempts.as_str(),
        ]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

/// The account records and the master password of the current session.
///
/// Debug output omits the password and record contents.
pub struct Vault {
    channel: StorageChannel,
    codec: CipherCodec,
    keys: StorageKeys,
    records: Vec<AccountRecord>,
    /// The in-memory list reflects the stored blob.
    records_loaded: bool,
    master_password: Option<SecretString>,
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("keys", &self.keys)
            .field("records", &self.records.len())
            .field("records_loaded", &self.records_loaded)
            .field(
                "master_password",
                &self.master_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Vault {
    /// A locked vault with no records loaded.
    pub fn new(store: Arc<dyn SecureStore>, codec: CipherCodec, keys: StorageKeys) -> Self {
        Self {
            channel: StorageChannel::new(store, codec.clone()),
            codec,
            keys,
            records: Vec::new(),
            records_loaded: false,
            master_password: None,
        }
    }

    /// Build a vault from the `[crypto]`, `[storage]` and `[device]` sections.
    pub fn from_config(
        store: Arc<dyn SecureStore>,
        config: &TopSecretConfig,
    ) -> Result<Self, TopSecretError> {
        let params = KdfParams::from_config(&config.crypto)?;
        let codec = CipherCodec::new(params, device::from_config(&config.device));
        Ok(Self::new(
            store,
            codec,
            StorageKeys::from_config(&config.storage),
        ))
    }

    pub fn channel(&self) -> &StorageChannel {
        &self.channel
    }

    pub fn codec(&self) -> &CipherCodec {
        &self.codec
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[AccountRecord] {
        &self.records
    }

    pub fn record(&self, id: Uuid) -> Option<&AccountRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn is_unlocked(&self) -> bool {
        self.master_password.is_some()
    }

    /// Use `password` for all later encryption. Call only after the password
    /// has been verified against the stored entry.
    pub fn unlock(&mut self, password: &str) {
        self.master_password = Some(SecretString::from(password.to_string()));
    }

    /// Forget the password and the in-memory records. Storage is untouched.
    pub fn lock(&mut self) {
        self.master_password = None;
        self.records.clear();
        self.records_loaded = false;
    }

    fn password(&self) -> Result<&SecretString, TopSecretError> {
        self.master_password.as_ref().ok_or_else(|| {
            TopSecretError::InvalidArgument("no master password has been set".to_string())
        })
    }

    /// Encrypt `plaintext` under the current master password.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, TopSecretError> {
        self.codec.encrypt(plaintext, self.password()?)
    }

    /// Decrypt `ciphertext` under the current master password.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, TopSecretError> {
        self.codec.decrypt(ciphertext, self.password()?)
    }

    /// Replace the in-memory records with the stored blob.
    ///
    /// A missing or blank blob leaves the current list untouched. Storage and
    /// decryption failures are returned, never reported as an empty vault.
    pub async fn populate_records(&mut self) -> Result<(), TopSecretError> {
        let blob = self
            .channel
            .load_decrypted(&self.keys.account_data, self.password()?)
            .await?
            .map(Zeroizing::new);

        match blob {
            Some(blob) if !blob.trim().is_empty() => {
                self.records = records::deserialize(Some(blob.as_str()));
                debug!(records = self.records.len(), "records loaded");
            }
            _ => debug!("no stored records"),
        }
        self.records_loaded = true;
        Ok(())
    }

    /// Insert or replace `record` (matched by id) and persist.
    ///
    /// Returns `false` without touching anything when the account name is
    /// absent or blank.
    pub async fn update_record(&mut self, record: AccountRecord) -> Result<bool, TopSecretError> {
        if !record.has_account_name() {
            debug!(id = %record.id(), "record without account name ignored");
            return Ok(false);
        }
        records::validate_record(&record)?;
        self.password()?;

        let id = record.id();
        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        self.save_records().await?;
        self.records_loaded = true;
        Ok(true)
    }

    /// Remove the record with `id` and persist. `false` when no such record.
    pub async fn delete_record(&mut self, id: Uuid) -> Result<bool, TopSecretError> {
        if id.is_nil() {
            return Err(TopSecretError::InvalidArgument(
                "record id must not be nil".to_string(),
            ));
        }
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        self.password()?;

        self.records.remove(index);
        self.save_records().await?;
        self.records_loaded = true;
        debug!(%id, "record deleted");
        Ok(true)
    }

    /// The stored master password entry (its ciphertext), `None` before first use.
    pub async fn get_master_password(&self) -> Result<Option<String>, TopSecretError> {
        self.channel.load(&self.keys.master_password).await
    }

    /// Make `new_password` the master password and re-encrypt all records.
    ///
    /// Blank input is ignored. An unlocked vault whose records were never
    /// loaded reads them under the old password first, so nothing stays
    /// encrypted under it. If any step after the stored entry was touched
    /// fails, the previous entry and in-process password are restored and
    /// `MasterPasswordRotationFailed` is returned.
    pub async fn change_master_password(&mut self, new_password: &str) -> Result<(), TopSecretError> {
        if new_password.trim().is_empty() {
            debug!("blank master password ignored");
            return Ok(());
        }
        if self.is_unlocked() && !self.records_loaded {
            self.populate_records().await?;
        }

        let new_secret = SecretString::from(new_password.to_string());
        let entry = self.codec.encrypt(new_password, &new_secret)?;
        let previous_entry = self.get_master_password().await?;
        let previous_password = self.master_password.replace(new_secret);

        match self.rotate(&entry).await {
            Ok(()) => {
                self.records_loaded = true;
                info!(records = self.records.len(), "master password changed");
                Ok(())
            }
            Err(source) => {
                self.master_password = previous_password;
                self.restore_master_entry(previous_entry).await;
                Err(TopSecretError::MasterPasswordRotationFailed {
                    source: Box::new(source),
                })
            }
        }
    }

    async fn rotate(&self, entry: &str) -> Result<(), TopSecretError> {
        let key = &self.keys.master_password;
        self.channel.remove(key).await?;
        self.channel.save(key, entry).await?;

        if self.channel.load(key).await?.as_deref() != Some(entry) {
            return Err(TopSecretError::Internal(
                "stored master password entry does not match what was written".to_string(),
            ));
        }

        // A stale blob would be unreadable under the new password.
        let blob = Zeroizing::new(records::serialize(&self.records));
        if blob.is_empty() {
            return self.channel.remove(&self.keys.account_data).await;
        }
        self.channel
            .save_encrypted(&self.keys.account_data, &blob, self.password()?)
            .await
    }

    async fn restore_master_entry(&self, previous: Option<String>) {
        let key = &self.keys.master_password;
        let restored = match &previous {
            Some(entry) => self.channel.save(key, entry).await,
            None => self.channel.remove(key).await,
        };
        match restored {
            Ok(()) => info!("master password entry rolled back"),
            Err(e) => error!(error = %e, "failed to roll back master password entry"),
        }
    }

    /// Delete every vault entry from storage and clear in-memory state.
    pub async fn wipe(&mut self) -> Result<(), TopSecretError> {
        for key in self.keys.all() {
            self.channel.remove(key).await?;
        }
        self.records.clear();
        self.records_loaded = false;
        self.master_password = None;
        info!("vault wiped");
        Ok(())
    }

    /// Encrypt and store the record blob. An empty blob is not written, so
    /// an encrypted placeholder never hides data from a later load.
    async fn save_records(&self) -> Result<(), TopSecretError> {
        let blob = Zeroizing::new(records::serialize(&self.records));
        if blob.is_empty() {
            debug!("nothing to persist, save skipped");
            return Ok(());
        }

        self.channel
            .save_encrypted(&self.keys.account_data, &blob, self.password()?)
            .await?;
        debug!(records = self.records.len(), "records saved");
        Ok(())
    }
}
