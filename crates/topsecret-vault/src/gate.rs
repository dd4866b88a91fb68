// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password verification and failed-attempt lockout.
//!
//! A candidate password is checked by encrypting it with itself and
//! comparing the result to the stored entry. The first password ever
//! offered becomes the master password. Consecutive failures are counted in
//! the secure store; past the configured limit the vault is wiped.

use secrecy::SecretString;
use topsecret_config::model::LoginConfig;
use topsecret_core::TopSecretError;
use tracing::{info, warn};

use crate::vault::Vault;

/// What a login attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The password matched the stored entry. The vault is unlocked.
    Granted,
    /// No master password existed; the attempt established it.
    Bootstrapped,
    /// Wrong password. `failed_attempts` is the updated counter.
    Denied { failed_attempts: u32 },
    /// Wrong password past the limit. Everything has been erased.
    Wiped,
    /// Blank input. Nothing was checked or counted.
    Rejected,
}

impl LoginOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted | Self::Bootstrapped)
    }
}

/// Checks candidate master passwords against a [`Vault`].
#[derive(Debug, Clone)]
pub struct MasterPasswordGate {
    max_failed_attempts: u32,
}

impl Default for MasterPasswordGate {
    fn default() -> Self {
        Self::from_config(&LoginConfig::default())
    }
}

impl MasterPasswordGate {
    /// `max_failed_attempts = 0` disables the wipe.
    pub fn new(max_failed_attempts: u32) -> Self {
        Self {
            max_failed_attempts,
        }
    }

    pub fn from_config(config: &LoginConfig) -> Self {
        Self::new(config.max_failed_attempts)
    }

    /// `true` when `attempted` is (or has just become) the master password.
    pub async fn verify(&self, vault: &mut Vault, attempted: &str) -> Result<bool, TopSecretError> {
        Ok(self.attempt(vault, attempted).await?.is_granted())
    }

    /// Check `attempted` and apply the bootstrap and lockout rules.
    pub async fn attempt(
        &self,
        vault: &mut Vault,
        attempted: &str,
    ) -> Result<LoginOutcome, TopSecretError> {
        if attempted.trim().is_empty() {
            return Ok(LoginOutcome::Rejected);
        }

        let Some(stored) = vault
            .get_master_password()
            .await?
            .filter(|entry| !entry.trim().is_empty())
        else {
            vault.change_master_password(attempted).await?;
            self.reset_failures(vault).await?;
            info!("master password established");
            return Ok(LoginOutcome::Bootstrapped);
        };

        let candidate = vault
            .codec()
            .encrypt(attempted, &SecretString::from(attempted.to_string()))?;

        if candidate == stored {
            vault.unlock(attempted);
            self.reset_failures(vault).await?;
            return Ok(LoginOutcome::Granted);
        }

        self.record_failure(vault).await
    }

    async fn reset_failures(&self, vault: &Vault) -> Result<(), TopSecretError> {
        vault
            .channel()
            .save(&vault.keys().failed_attempts, "0")
            .await
    }

    async fn record_failure(&self, vault: &mut Vault) -> Result<LoginOutcome, TopSecretError> {
        let key = vault.keys().failed_attempts.clone();
        let counter = vault.channel().load(&key).await?;

        let previous = match counter.as_deref().map(str::trim) {
            None => Some(0),
            Some(raw) => raw.parse::<u32>().ok(),
        };

        match previous {
            Some(count) if self.max_failed_attempts == 0 || count <= self.max_failed_attempts => {
                let failed_attempts = count.saturating_add(1);
                vault
                    .channel()
                    .save(&key, &failed_attempts.to_string())
                    .await?;
                warn!(failed_attempts, "master password rejected");
                Ok(LoginOutcome::Denied { failed_attempts })
            }
            _ => {
                warn!("too many failed logins, wiping vault");
                vault.wipe().await?;
                Ok(LoginOutcome::Wiped)
            }
        }
    }
}
