// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory secure store with failure injection.
//!
//! `MemoryStore` implements `SecureStore` over a `HashMap` so vault tests run
//! without a database. Writes or reads of chosen keys can be made to fail,
//! every call can be slowed down, and the highest number of overlapping calls
//! is recorded.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use topsecret_core::{SecureStore, TopSecretError};

#[derive(Default)]
struct State {
    entries: HashMap<String, String>,
    fail_on_set: HashSet<String>,
    fail_on_get: HashSet<String>,
    fail_on_remove: HashSet<String>,
    delay: Option<Duration>,
    calls: usize,
}

/// A `SecureStore` kept in process memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the store from the others.
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Write an entry directly, bypassing injected failures.
    pub fn insert(&self, key: &str, value: &str) {
        self.state()
            .entries
            .insert(key.to_string(), value.to_string());
    }

    /// Read an entry directly, bypassing injected failures.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.state().entries.get(key).cloned()
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.state().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every later `set` of `key` fail.
    pub fn fail_on_set(&self, key: &str) {
        self.state().fail_on_set.insert(key.to_string());
    }

    /// Make every later `get` of `key` fail.
    pub fn fail_on_get(&self, key: &str) {
        self.state().fail_on_get.insert(key.to_string());
    }

    /// Make every later `remove` of `key` fail.
    pub fn fail_on_remove(&self, key: &str) {
        self.state().fail_on_remove.insert(key.to_string());
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        let mut state = self.state();
        state.fail_on_set.clear();
        state.fail_on_get.clear();
        state.fail_on_remove.clear();
    }

    /// Sleep this long inside every call.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    /// Total number of `get`/`set`/`remove` calls so far.
    pub fn call_count(&self) -> usize {
        self.state().calls
    }

    /// The most calls that were ever running at the same time.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> CallGuard {
        let delay = {
            let mut state = self.state();
            state.calls += 1;
            state.delay
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = CallGuard(Arc::clone(&self.in_flight));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        guard
    }
}

struct CallGuard(Arc<AtomicUsize>);

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn injected(op: &str, key: &str) -> TopSecretError {
    TopSecretError::Storage {
        source: format!("injected {op} failure for key {key}").into(),
    }
}

#[async_trait]
impl SecureStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TopSecretError> {
        let _call = self.enter().await;
        let state = self.state();
        if state.fail_on_get.contains(key) {
            return Err(injected("get", key));
        }
        Ok(state.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), TopSecretError> {
        let _call = self.enter().await;
        let mut state = self.state();
        if state.fail_on_set.contains(key) {
            return Err(injected("set", key));
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), TopSecretError> {
        let _call = self.enter().await;
        let mut state = self.state();
        if state.fail_on_remove.contains(key) {
            return Err(injected("remove", key));
        }
        state.entries.remove(key);
        Ok(())
    }
}
