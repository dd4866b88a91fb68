// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device identifier capability used to bind derived keys to one install.

/// Best-effort source of a per-device identifier.
///
/// Returning `None` is allowed and degrades key binding (an empty string is
/// substituted) but never fails key derivation.
pub trait DeviceIdentifier: Send + Sync + 'static {
    /// Returns the identifier of this device, if one is available.
    fn device_id(&self) -> Option<String>;
}
