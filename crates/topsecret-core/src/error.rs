// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the TopSecret vault core.

use thiserror::Error;

/// The primary error type used across the vault, its codecs, and storage adapters.
#[derive(Debug, Error)]
pub enum TopSecretError {
    /// A required argument was missing or malformed (absent password, nil record id,
    /// field value that would break the record wire format).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Ciphertext was not valid Base64. Signals corrupted stored data.
    #[error("invalid ciphertext format: the encrypted data may be corrupted")]
    InvalidCiphertextFormat {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Decryption failed: wrong password, or corrupted/tampered ciphertext.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Unexpected failure while encrypting.
    #[error("encryption failed: {source}")]
    EncryptionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Records could not be re-persisted under a new master password. The
    /// previous master password entry has been restored.
    #[error("master password rotation failed: {source}")]
    MasterPasswordRotationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Storage backend errors (secure store I/O, database failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid KDF parameters, missing keys).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TopSecretError {
    /// Returns `true` for errors caused by unreadable stored ciphertext
    /// (bad Base64 or a failed decrypt).
    pub fn is_crypto_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCiphertextFormat { .. } | Self::DecryptionFailed(_)
        )
    }
}
