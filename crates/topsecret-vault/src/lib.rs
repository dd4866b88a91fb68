// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master-password credential vault.
//!
//! Account records are serialized into one text blob, encrypted with
//! AES-256-CBC under a key derived (PBKDF2-HMAC-SHA512) from the master
//! password and the device identifier, and kept in a platform
//! [`SecureStore`](topsecret_core::SecureStore). The master password itself
//! is stored as its own ciphertext and verified by re-encrypting the
//! candidate.
//!
//! # Usage
//!
//! ```no_run
//! # async fn run(store: std::sync::Arc<dyn topsecret_core::SecureStore>) -> Result<(), topsecret_core::TopSecretError> {
//! use topsecret_vault::{MasterPasswordGate, Vault};
//!
//! let config = topsecret_config::TopSecretConfig::default();
//! let mut vault = Vault::from_config(store, &config)?;
//! let gate = MasterPasswordGate::from_config(&config.login);
//!
//! if gate.verify(&mut vault, "correct horse").await? {
//!     vault.populate_records().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod cipher;
pub mod device;
pub mod gate;
pub mod kdf;
pub mod records;
pub mod vault;

pub use channel::StorageChannel;
pub use cipher::CipherCodec;
pub use device::{FixedDeviceId, HostDeviceId, MachineId, NoDeviceId};
pub use gate::{LoginOutcome, MasterPasswordGate};
pub use kdf::{DerivedKey, KdfParams, derive_key_material};
pub use vault::{StorageKeys, Vault};
