// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA512 key derivation from the master password.
//!
//! One derivation yields 48 bytes: the first 32 are the AES-256 key, the
//! next 16 the CBC IV. The KDF input is the application secret, the password
//! and the device identifier concatenated as UTF-8, so ciphertext produced
//! on one device does not decrypt on another.

use std::fmt;
use std::num::NonZeroU32;

use ring::pbkdf2;
use secrecy::{ExposeSecret, SecretString};
use topsecret_config::model::CryptoConfig;
use topsecret_core::TopSecretError;
use zeroize::Zeroizing;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Salt, application secret and iteration count for PBKDF2.
///
/// All three are fixed for an installation; changing any of them makes
/// existing ciphertext unreadable.
#[derive(Clone)]
pub struct KdfParams {
    iterations: NonZeroU32,
    salt: Vec<u8>,
    app_secret: Zeroizing<String>,
}

impl KdfParams {
    /// Build parameters, rejecting a zero iteration count or an empty salt.
    pub fn new(
        iterations: u32,
        salt: impl Into<Vec<u8>>,
        app_secret: impl Into<String>,
    ) -> Result<Self, TopSecretError> {
        let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
            TopSecretError::InvalidArgument("KDF iteration count must be non-zero".to_string())
        })?;
        let salt = salt.into();
        if salt.is_empty() {
            return Err(TopSecretError::InvalidArgument(
                "KDF salt must not be empty".to_string(),
            ));
        }
        Ok(Self {
            iterations,
            salt,
            app_secret: Zeroizing::new(app_secret.into()),
        })
    }

    pub fn from_config(config: &CryptoConfig) -> Result<Self, TopSecretError> {
        Self::new(
            config.kdf_iterations,
            config.kdf_salt.as_bytes(),
            config.app_secret.as_str(),
        )
        .map_err(|e| TopSecretError::Config(format!("crypto: {e}")))
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }
}

impl fmt::Debug for KdfParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdfParams")
            .field("iterations", &self.iterations)
            .field("salt_len", &self.salt.len())
            .field("app_secret", &"[REDACTED]")
            .finish()
    }
}

/// AES key and IV derived for one (password, device) pair.
///
/// The key is zeroed on drop.
pub struct DerivedKey {
    key: Zeroizing<[u8; KEY_LEN]>,
    iv: [u8; IV_LEN],
}

impl DerivedKey {
    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }
}

/// Derive the AES key and IV for `password` on the device `device_id`.
///
/// Deterministic: the same inputs always give the same output. Nothing is
/// cached, every call runs the full iteration count.
pub fn derive_key_material(
    password: &SecretString,
    device_id: &str,
    params: &KdfParams,
) -> DerivedKey {
    let password = password.expose_secret();
    let mut input =
        Zeroizing::new(Vec::with_capacity(params.app_secret.len() + password.len() + device_id.len()));
    input.extend_from_slice(params.app_secret.as_bytes());
    input.extend_from_slice(password.as_bytes());
    input.extend_from_slice(device_id.as_bytes());

    let mut output = Zeroizing::new([0u8; KEY_LEN + IV_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA512,
        params.iterations,
        &params.salt,
        &input,
        output.as_mut(),
    );

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&output[..KEY_LEN]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&output[KEY_LEN..]);

    DerivedKey { key, iv }
}
