// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialized access to the platform secure store.
//!
//! Every operation holds the channel mutex for the duration of its I/O, so
//! at most one storage call is in flight at a time. Writes run on a spawned
//! task that owns the guard: once started, a write completes even if the
//! caller's future is dropped.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::Mutex;
use topsecret_core::{SecureStore, TopSecretError};
use tracing::debug;

use crate::cipher::CipherCodec;

/// The vault's only path to persistent storage.
#[derive(Clone)]
pub struct StorageChannel {
    store: Arc<dyn SecureStore>,
    codec: CipherCodec,
    lock: Arc<Mutex<()>>,
}

impl StorageChannel {
    pub fn new(store: Arc<dyn SecureStore>, codec: CipherCodec) -> Self {
        Self {
            store,
            codec,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// `true` while a storage operation holds the channel.
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    /// Raw value under `key`. Missing and blank values are both `None`.
    pub async fn load(&self, key: &str) -> Result<Option<String>, TopSecretError> {
        let _guard = self.lock.lock().await;
        let value = self.store.get(key).await?;
        debug!(key, found = value.is_some(), "loaded entry");
        Ok(value.filter(|v| !v.trim().is_empty()))
    }

    /// Load `key` and decrypt it with `password`.
    pub async fn load_decrypted(
        &self,
        key: &str,
        password: &SecretString,
    ) -> Result<Option<String>, TopSecretError> {
        match self.load(key).await? {
            Some(ciphertext) => self.codec.decrypt(&ciphertext, password).map(Some),
            None => Ok(None),
        }
    }

    /// Store `value` under `key` verbatim.
    pub async fn save(&self, key: &str, value: &str) -> Result<(), TopSecretError> {
        let guard = self.lock.clone().lock_owned().await;
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        let value = value.to_string();

        tokio::spawn(async move {
            let _guard = guard;
            store.set(&key, &value).await?;
            debug!(key = %key, "saved entry");
            Ok(())
        })
        .await
        .map_err(|e| TopSecretError::Internal(format!("storage write task failed: {e}")))?
    }

    /// Encrypt `value` with `password`, then store it under `key`.
    pub async fn save_encrypted(
        &self,
        key: &str,
        value: &str,
        password: &SecretString,
    ) -> Result<(), TopSecretError> {
        let ciphertext = self.codec.encrypt(value, password)?;
        self.save(key, &ciphertext).await
    }

    /// Delete `key`. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), TopSecretError> {
        let guard = self.lock.clone().lock_owned().await;
        let store = Arc::clone(&self.store);
        let key = key.to_string();

        tokio::spawn(async move {
            let _guard = guard;
            store.remove(&key).await?;
            debug!(key = %key, "removed entry");
            Ok(())
        })
        .await
        .map_err(|e| TopSecretError::Internal(format!("storage remove task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::FixedDeviceId;
    use crate::kdf::KdfParams;
    use topsecret_test_utils::MemoryStore;

    fn channel() -> (Arc<MemoryStore>, StorageChannel) {
        let store = Arc::new(MemoryStore::new());
        let codec = CipherCodec::new(
            KdfParams::new(1_000, "salt", "secret").unwrap(),
            Arc::new(FixedDeviceId("test".into())),
        );
        (store.clone(), StorageChannel::new(store, codec))
    }

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn load_treats_blank_as_absent() {
        let (store, channel) = channel();
        assert_eq!(channel.load("k").await.unwrap(), None);

        store.insert("k", "   ");
        assert_eq!(channel.load("k").await.unwrap(), None);

        store.insert("k", "value");
        assert_eq!(channel.load("k").await.unwrap().as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn save_encrypted_stores_ciphertext_only() {
        let (store, channel) = channel();
        channel
            .save_encrypted("AccountData", "plain text", &pw("master"))
            .await
            .unwrap();

        let raw = store.get_raw("AccountData").unwrap();
        assert!(!raw.contains("plain text"));
        assert_eq!(
            channel
                .load_decrypted("AccountData", &pw("master"))
                .await
                .unwrap()
                .as_deref(),
            Some("plain text")
        );
    }

    #[tokio::test]
    async fn load_decrypted_missing_key_is_none() {
        let (_store, channel) = channel();
        assert_eq!(channel.load_decrypted("nope", &pw("pw")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_deletes_entry() {
        let (store, channel) = channel();
        channel.save("k", "v").await.unwrap();
        channel.remove("k").await.unwrap();
        assert!(store.get_raw("k").is_none());
    }

    #[tokio::test]
    async fn store_failures_propagate_and_release_the_lock() {
        let (store, channel) = channel();
        store.fail_on_set("k");

        let err = channel.save("k", "v").await.unwrap_err();
        assert!(matches!(err, TopSecretError::Storage { .. }), "{err}");
        assert!(!channel.is_busy());

        channel.save("other", "v").await.unwrap();
    }

    #[tokio::test]
    async fn busy_while_lock_is_held() {
        let (_store, channel) = channel();
        assert!(!channel.is_busy());

        let guard = channel.lock.clone().lock_owned().await;
        assert!(channel.is_busy());
        drop(guard);
        assert!(!channel.is_busy());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_writes_are_serialized() {
        let (store, channel) = channel();
        store.set_delay(std::time::Duration::from_millis(20));

        let mut handles = Vec::new();
        for i in 0..5 {
            let channel = channel.clone();
            handles.push(tokio::spawn(async move {
                channel.save(&format!("k{i}"), "v").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.max_concurrent_calls(), 1);
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn started_write_completes_when_caller_is_dropped() {
        let (store, channel) = channel();
        store.set_delay(std::time::Duration::from_millis(50));

        let write = tokio::spawn({
            let channel = channel.clone();
            async move { channel.save("k", "v").await }
        });
        // Let the write acquire the lock and start.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        write.abort();

        // The next operation waits for the in-flight write to finish.
        assert_eq!(channel.load("k").await.unwrap().as_deref(), Some("v"));
    }
}
