// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the TopSecret vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level TopSecret configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TopSecretConfig {
    /// Key derivation parameters.
    #[serde(default)]
    pub crypto: CryptoConfig,

    /// Secure storage location and key names.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Login attempt policy.
    #[serde(default)]
    pub login: LoginConfig,

    /// Device binding settings.
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Key derivation configuration.
///
/// The salt and application secret are static for an install. Changing any
/// value here makes every previously stored ciphertext unreadable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CryptoConfig {
    /// PBKDF2-HMAC-SHA512 iteration count (default: 128000).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Static PBKDF2 salt.
    #[serde(default = "default_kdf_salt")]
    pub kdf_salt: String,

    /// Application secret prepended to the password before derivation.
    #[serde(default = "default_app_secret")]
    pub app_secret: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            kdf_salt: default_kdf_salt(),
            app_secret: default_app_secret(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    128_000
}

fn default_kdf_salt() -> String {
    "TopSecret static salt v1".to_string()
}

fn default_app_secret() -> String {
    "TopSecret application key material v1".to_string()
}

/// Secure storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database backing the secure store.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Key holding the encrypted account-record blob.
    #[serde(default = "default_account_data_key")]
    pub account_data_key: String,

    /// Key holding the encrypted master password.
    #[serde(default = "default_master_password_key")]
    pub master_password_key: String,

    /// Key holding the failed-login counter.
    #[serde(default = "default_failed_attempts_key")]
    pub failed_attempts_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            account_data_key: default_account_data_key(),
            master_password_key: default_master_password_key(),
            failed_attempts_key: default_failed_attempts_key(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("topsecret").join("topsecret.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("topsecret.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_account_data_key() -> String {
    "AccountData".to_string()
}

fn default_master_password_key() -> String {
    "MasterPassword".to_string()
}

fn default_failed_attempts_key() -> String {
    "badAttempts".to_string()
}

/// Login attempt policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoginConfig {
    /// Failed logins tolerated before the vault is wiped. `0` disables the wipe.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
        }
    }
}

fn default_max_failed_attempts() -> u32 {
    10
}

/// Device binding configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Fixed device identifier. `None` uses the host name.
    #[serde(default)]
    pub identifier: Option<String>,
}
