// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-CBC string encryption keyed by the master password.
//!
//! Plaintext is encoded as UTF-16LE, padded with PKCS#7, encrypted with the
//! key and IV from [`derive_key_material`] and returned as standard Base64.
//! The IV is derived, not random: the same plaintext, password and device
//! always produce the same ciphertext. Master password verification relies
//! on this.

use std::sync::Arc;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretString;
use topsecret_core::{DeviceIdentifier, TopSecretError};
use zeroize::Zeroizing;

use crate::kdf::{DerivedKey, KdfParams, derive_key_material};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const BLOCK_LEN: usize = 16;

/// Encrypts and decrypts strings under a password.
#[derive(Clone)]
pub struct CipherCodec {
    params: KdfParams,
    device: Arc<dyn DeviceIdentifier>,
}

impl CipherCodec {
    pub fn new(params: KdfParams, device: Arc<dyn DeviceIdentifier>) -> Self {
        Self { params, device }
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt `plaintext` and return Base64 ciphertext.
    ///
    /// Every UTF-8 input is encryptable. `EncryptionFailed` is only returned
    /// if the derived key material does not fit AES-256-CBC.
    pub fn encrypt(
        &self,
        plaintext: &str,
        password: &SecretString,
    ) -> Result<String, TopSecretError> {
        let derived = self.derive(password);
        let encoded: Zeroizing<Vec<u8>> = Zeroizing::new(
            plaintext
                .encode_utf16()
                .flat_map(u16::to_le_bytes)
                .collect(),
        );

        let ciphertext = Aes256CbcEnc::new_from_slices(derived.key(), derived.iv())
            .map_err(|e| TopSecretError::EncryptionFailed {
                source: e.to_string().into(),
            })?
            .encrypt_padded_vec_mut::<Pkcs7>(&encoded);

        Ok(STANDARD.encode(ciphertext))
    }

    /// Decrypt Base64 `ciphertext` produced by [`encrypt`](Self::encrypt).
    ///
    /// Empty input decrypts to the empty string. Invalid Base64 is
    /// `InvalidCiphertextFormat`; anything that fails afterwards (wrong
    /// password, truncated data, bad padding, invalid UTF-16) is
    /// `DecryptionFailed`.
    pub fn decrypt(
        &self,
        ciphertext: &str,
        password: &SecretString,
    ) -> Result<String, TopSecretError> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }

        let bytes = STANDARD
            .decode(ciphertext)
            .map_err(|e| TopSecretError::InvalidCiphertextFormat {
                source: Box::new(e),
            })?;

        if bytes.is_empty() || bytes.len() % BLOCK_LEN != 0 {
            return Err(TopSecretError::DecryptionFailed(format!(
                "ciphertext length {} is not a whole number of blocks",
                bytes.len()
            )));
        }

        let derived = self.derive(password);
        let plaintext = Zeroizing::new(
            Aes256CbcDec::new(
                GenericArray::from_slice(derived.key()),
                GenericArray::from_slice(derived.iv()),
            )
            .decrypt_padded_vec_mut::<Pkcs7>(&bytes)
            .map_err(|_| {
                TopSecretError::DecryptionFailed(
                    "invalid padding, wrong password or corrupted data".to_string(),
                )
            })?,
        );

        decode_utf16le(&plaintext)
    }

    fn derive(&self, password: &SecretString) -> DerivedKey {
        let device_id = self.device.device_id().unwrap_or_default();
        derive_key_material(password, &device_id, &self.params)
    }
}

fn decode_utf16le(bytes: &[u8]) -> Result<String, TopSecretError> {
    if bytes.len() % 2 != 0 {
        return Err(TopSecretError::DecryptionFailed(
            "plaintext is not valid UTF-16".to_string(),
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|_| TopSecretError::DecryptionFailed("plaintext is not valid UTF-16".to_string()))
}
