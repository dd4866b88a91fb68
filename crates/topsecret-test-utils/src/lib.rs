// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for TopSecret integration tests.
//!
//! # Components
//!
//! - [`MemoryStore`] - in-memory `SecureStore` with failure injection
//! - [`TestHarness`] - fast-KDF vaults over a shared store, reopened at will
//!   to simulate process restarts

pub mod harness;
pub mod memory_store;

pub use harness::TestHarness;
pub use memory_store::MemoryStore;
