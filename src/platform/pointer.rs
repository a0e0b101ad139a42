// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Secondary pointer to the data directory.
//!
//! Only Windows has one: `HKLM\Software\GeodeSDK` value `InstallInfo`.

use std::path::{Path, PathBuf};

use super::PlatformRegistry;
use crate::error::InstallerResult;

/// Platforms without an OS-level pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

impl PlatformRegistry for NoRegistry {
    fn read_data_directory(&self) -> Option<PathBuf> {
        None
    }

    fn write_data_directory(&self, _path: &Path) -> InstallerResult<()> {
        Ok(())
    }

    fn delete(&self) -> InstallerResult<()> {
        Ok(())
    }
}

/// Pointer stored in the Windows registry.
#[cfg(windows)]
#[derive(Debug, Clone)]
pub struct WindowsRegistry {
    subkey: String,
    value: String,
}

#[cfg(windows)]
impl Default for WindowsRegistry {
    fn default() -> Self {
        Self {
            subkey: r"Software\GeodeSDK".to_string(),
            value: "InstallInfo".to_string(),
        }
    }
}

#[cfg(windows)]
impl PlatformRegistry for WindowsRegistry {
    fn read_data_directory(&self) -> Option<PathBuf> {
        use winreg::RegKey;
        use winreg::enums::HKEY_LOCAL_MACHINE;

        let key = RegKey::predef(HKEY_LOCAL_MACHINE)
            .open_subkey(&self.subkey)
            .ok()?;
        key.get_value::<String, _>(&self.value)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    fn write_data_directory(&self, path: &Path) -> InstallerResult<()> {
        use crate::error::RegistryError;
        use winreg::RegKey;
        use winreg::enums::HKEY_LOCAL_MACHINE;

        let (key, _) = RegKey::predef(HKEY_LOCAL_MACHINE)
            .create_subkey(&self.subkey)
            .map_err(|e| RegistryError::PointerCreate {
                message: e.to_string(),
            })?;
        let value = path.to_string_lossy().into_owned();
        key.set_value(&self.value, &value)
            .map_err(|e| RegistryError::PointerWrite {
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn delete(&self) -> InstallerResult<()> {
        use crate::error::RegistryError;
        use winreg::RegKey;
        use winreg::enums::HKEY_LOCAL_MACHINE;

        match RegKey::predef(HKEY_LOCAL_MACHINE).delete_subkey_all(&self.subkey) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RegistryError::Delete {
                step: "registry key".to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }
}
