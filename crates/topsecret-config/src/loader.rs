// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./topsecret.toml` > `~/.config/topsecret/topsecret.toml`
//! > `/etc/topsecret/topsecret.toml` with environment variable overrides via
//! `TOPSECRET_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TopSecretConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/topsecret/topsecret.toml` (system-wide)
/// 3. `~/.config/topsecret/topsecret.toml` (user XDG config)
/// 4. `./topsecret.toml` (local directory)
/// 5. `TOPSECRET_*` environment variables
pub fn load_config() -> Result<TopSecretConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TopSecretConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TopSecretConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TopSecretConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TopSecretConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TopSecretConfig::default()))
        .merge(Toml::file("/etc/topsecret/topsecret.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("topsecret/topsecret.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("topsecret.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `TOPSECRET_STORAGE_DATABASE_PATH`
/// must map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("TOPSECRET_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("crypto_", "crypto.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("login_", "login.", 1)
            .replacen("device_", "device.", 1);
        mapped.into()
    })
}
