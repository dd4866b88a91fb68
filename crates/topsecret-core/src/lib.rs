// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the TopSecret credential vault.
//!
//! This crate provides the error taxonomy, the [`AccountRecord`] domain type,
//! and the adapter traits the vault depends on. Platform integrations (secure
//! key-value storage, device identifiers) implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TopSecretError;
pub use types::AccountRecord;

pub use traits::{DeviceIdentifier, SecureStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_all_variants() {
        let _invalid = TopSecretError::InvalidArgument("test".into());
        let _format = TopSecretError::InvalidCiphertextFormat {
            source: Box::new(std::io::Error::other("test")),
        };
        let _decrypt = TopSecretError::DecryptionFailed("test".into());
        let _encrypt = TopSecretError::EncryptionFailed {
            source: Box::new(std::io::Error::other("test")),
        };
        let _rotation = TopSecretError::MasterPasswordRotationFailed {
            source: Box::new(std::io::Error::other("test")),
        };
        let _storage = TopSecretError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _config = TopSecretError::Config("test".into());
        let _internal = TopSecretError::Internal("test".into());
    }

    #[test]
    fn crypto_failures_are_classified() {
        assert!(TopSecretError::DecryptionFailed("bad padding".into()).is_crypto_failure());
        assert!(
            TopSecretError::InvalidCiphertextFormat {
                source: Box::new(std::io::Error::other("bad base64")),
            }
            .is_crypto_failure()
        );
        assert!(!TopSecretError::Internal("x".into()).is_crypto_failure());
    }

    #[test]
    fn rotation_failure_message_includes_cause() {
        let err = TopSecretError::MasterPasswordRotationFailed {
            source: Box::new(TopSecretError::Storage {
                source: "disk full".into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("rotation failed"), "{msg}");
        assert!(msg.contains("disk full"), "{msg}");
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_secure_store<T: SecureStore>() {}
        fn _assert_device_identifier<T: DeviceIdentifier>() {}
    }
}
