// SPDX-FileCopyrightText: 2026 TopSecret Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device identifier providers.
//!
//! The identifier is mixed into the KDF input, so it must not change for the
//! lifetime of the stored data. A provider that cannot produce one yields
//! `None` and the empty string is used.

use std::path::PathBuf;
use std::sync::Arc;

use sysinfo::System;
use topsecret_config::model::DeviceConfig;
use topsecret_core::DeviceIdentifier;
use tracing::debug;

/// Uses the host name reported by the operating system.
///
/// Users can rename a machine, and a renamed host can no longer read its
/// own ciphertext. Prefer [`MachineId`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HostDeviceId;

impl DeviceIdentifier for HostDeviceId {
    fn device_id(&self) -> Option<String> {
        System::host_name().filter(|name| !name.is_empty())
    }
}

/// The OS machine id (`/etc/machine-id` on systemd hosts), which survives
/// host renames. Falls back to the host name when no id file is readable.
#[derive(Debug, Clone)]
pub struct MachineId {
    paths: Vec<PathBuf>,
}

impl Default for MachineId {
    fn default() -> Self {
        Self::with_paths(["/etc/machine-id", "/var/lib/dbus/machine-id"])
    }
}

impl MachineId {
    /// Read the id from the first of `paths` holding a non-blank value.
    pub fn with_paths<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    fn read_id(&self) -> Option<String> {
        self.paths.iter().find_map(|path| {
            let id = std::fs::read_to_string(path).ok()?;
            let id = id.trim();
            (!id.is_empty()).then(|| id.to_string())
        })
    }
}

impl DeviceIdentifier for MachineId {
    fn device_id(&self) -> Option<String> {
        self.read_id().or_else(|| {
            debug!("no machine id found, using host name");
            HostDeviceId.device_id()
        })
    }
}

/// A caller-supplied identifier, e.g. one the host platform persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDeviceId(pub String);

impl DeviceIdentifier for FixedDeviceId {
    fn device_id(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Never yields an identifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDeviceId;

impl DeviceIdentifier for NoDeviceId {
    fn device_id(&self) -> Option<String> {
        None
    }
}

/// Pick the provider named by `[device]`: a fixed identifier if one is
/// configured, the machine id otherwise.
///
/// Without a configured identifier, a host that has no machine id file
/// falls back to its host name, and renaming it makes existing ciphertext
/// unreadable. Configure `device.identifier` on such hosts.
pub fn from_config(config: &DeviceConfig) -> Arc<dyn DeviceIdentifier> {
    match &config.identifier {
        Some(id) => {
            debug!("using configured device identifier");
            Arc::new(FixedDeviceId(id.clone()))
        }
        None => Arc::new(MachineId::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_id_is_returned_verbatim() {
        assert_eq!(
            FixedDeviceId("pixel-7".into()).device_id().as_deref(),
            Some("pixel-7")
        );
    }

    #[test]
    fn no_device_id_is_none() {
        assert_eq!(NoDeviceId.device_id(), None);
    }

    #[test]
    fn host_device_id_is_stable() {
        assert_eq!(HostDeviceId.device_id(), HostDeviceId.device_id());
    }

    #[test]
    fn from_config_prefers_configured_identifier() {
        let config = DeviceConfig {
            identifier: Some("tablet".into()),
        };
        assert_eq!(from_config(&config).device_id().as_deref(), Some("tablet"));
    }

    #[test]
    fn machine_id_reads_first_non_blank_file() {
        let dir = tempfile::tempdir().unwrap();
        let blank = dir.path().join("blank");
        let id = dir.path().join("machine-id");
        std::fs::write(&blank, "  \n").unwrap();
        std::fs::write(&id, "4c4c4544003\n").unwrap();

        let provider = MachineId::with_paths([dir.path().join("missing"), blank, id]);
        assert_eq!(provider.device_id().as_deref(), Some("4c4c4544003"));
    }

    #[test]
    fn machine_id_without_files_uses_host_name() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MachineId::with_paths([dir.path().join("missing")]);
        assert_eq!(provider.device_id(), HostDeviceId.device_id());
    }

    #[test]
    fn from_config_defaults_to_machine_id() {
        let provider = from_config(&DeviceConfig::default());
        assert_eq!(provider.device_id(), MachineId::default().device_id());
    }
}
