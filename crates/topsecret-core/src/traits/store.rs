// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secure key-value storage trait (platform keychain, keystore, SQLite, etc.).

use async_trait::async_trait;

use crate::error::TopSecretError;

/// Device-scoped key-value storage for opaque strings.
///
/// Implementations are expected to make each individual `get`/`set`/`remove`
/// atomic. The vault never stores plaintext through this trait except the
/// failed-login counter; everything else is ciphertext.
#[async_trait]
pub trait SecureStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, TopSecretError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), TopSecretError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), TopSecretError>;
}
