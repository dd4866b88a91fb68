// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the platform collaborators of the vault.
//!
//! Storage uses `#[async_trait]` for dynamic dispatch compatibility; the
//! vault holds its collaborators as `Arc<dyn Trait>`.

pub mod device;
pub mod store;

pub use device::DeviceIdentifier;
pub use store::SecureStore;
