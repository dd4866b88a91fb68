// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the TopSecret vault.
//!
//! TOML files layered over compiled defaults, `TOPSECRET_*` environment
//! overrides, strict key checking (`deny_unknown_fields`) and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use topsecret_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("store: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TopSecretConfig;

use tracing::{debug, warn};

/// Load configuration from the file hierarchy and validate it.
///
/// Figment errors are turned into diagnostics carrying source spans for the
/// TOML files that were found on disk.
pub fn load_and_validate() -> Result<TopSecretConfig, Vec<ConfigError>> {
    let result = match loader::load_config() {
        Ok(config) => validated(config),
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    };
    log_outcome(&result);
    result
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TopSecretConfig, Vec<ConfigError>> {
    let result = match loader::load_config_from_str(toml_content) {
        Ok(config) => validated(config),
        Err(err) => {
            let sources = [("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    };
    log_outcome(&result);
    result
}

fn validated(config: TopSecretConfig) -> Result<TopSecretConfig, Vec<ConfigError>> {
    validation::validate_config(&config)?;
    Ok(config)
}

fn log_outcome(result: &Result<TopSecretConfig, Vec<ConfigError>>) {
    match result {
        Ok(config) => debug!(
            database_path = %config.storage.database_path,
            kdf_iterations = config.crypto.kdf_iterations,
            "configuration loaded"
        ),
        Err(errors) => warn!(errors = errors.len(), "configuration rejected"),
    }
}

/// Read every config file that exists, keyed by the path figment reports.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join("topsecret.toml"))
        .unwrap_or_else(|_| "topsecret.toml".into());
    let user = dirs::config_dir().map(|d| d.join("topsecret").join("topsecret.toml"));
    let system = std::path::PathBuf::from("/etc/topsecret/topsecret.toml");

    [Some(local), user, Some(system)]
        .into_iter()
        .flatten()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            debug!(path = %path.display(), "config source read for diagnostics");
            Some((path.display().to_string(), content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn rejected_config_is_logged() {
        let errors = load_and_validate_str("[crypto]\nkdf_iterations = 5\n").unwrap_err();
        assert!(!errors.is_empty());
        assert!(logs_contain("configuration rejected"));
    }

    #[test]
    #[traced_test]
    fn loaded_config_is_logged_without_secrets() {
        load_and_validate_str("").unwrap();
        assert!(logs_contain("configuration loaded"));
        assert!(!logs_contain("app_secret"));
    }
}
