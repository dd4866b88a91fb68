// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as minimum KDF cost and distinct storage keys.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::TopSecretConfig;

/// Lowest accepted PBKDF2 iteration count.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TopSecretConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.crypto.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::Validation {
            message: format!(
                "crypto.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                config.crypto.kdf_iterations
            ),
        });
    }

    if config.crypto.kdf_salt.is_empty() {
        errors.push(ConfigError::Validation {
            message: "crypto.kdf_salt must not be empty".to_string(),
        });
    }

    if config.crypto.app_secret.is_empty() {
        errors.push(ConfigError::Validation {
            message: "crypto.app_secret must not be empty".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let keys = [
        ("storage.account_data_key", &config.storage.account_data_key),
        ("storage.master_password_key", &config.storage.master_password_key),
        ("storage.failed_attempts_key", &config.storage.failed_attempts_key),
    ];

    for (name, value) in keys {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{name} must not be empty"),
            });
        }
    }

    let mut seen = HashSet::new();
    for (name, value) in keys {
        if !value.trim().is_empty() && !seen.insert(value.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("{name} `{value}` collides with another storage key"),
            });
        }
    }

    if let Some(id) = &config.device.identifier
        && id.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "device.identifier must not be blank when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
