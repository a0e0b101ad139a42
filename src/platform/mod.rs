// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Platform capabilities.
//!
//! ```text
//!            PlatformPaths                PlatformRegistry
//!   sdk dir / data dir / saves / game     data-dir pointer
//!     |         |          |                |          |
//!  Windows    MacOS      Linux           Windows     others
//!  (Steam)   (Steam)   (Proton)          (winreg)    (no-op)
//!     \_________|__________/
//!               |
//!         OverridePaths  <- [paths] from config
//!
//! LoaderLayout: payload dir, shim files, foreign loader markers
//! ```
//!
//! Each target gets a real implementation selected by `current_*()`; a
//! target without an OS pointer gets [`NoRegistry`].

pub mod layout;
pub mod paths;
pub mod pointer;
pub mod steam;


use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::InstallerResult;

pub use layout::{LoaderLayout, OtherModFlags};
pub use paths::{LinuxPaths, MacPaths, OverridePaths, WindowsPaths};
pub use pointer::NoRegistry;
#[cfg(windows)]
pub use pointer::WindowsRegistry;

/// Name of the directory created under the platform data roots.
pub const GEODE_DIR_NAME: &str = "GeodeSDK";

/// Platform-specific filesystem locations.
pub trait PlatformPaths: Debug + Send + Sync {
    /// Where the SDK payload lives when nothing else is recorded.
    fn default_sdk_directory(&self) -> PathBuf;

    /// Where `installer.json` lives when no OS pointer overrides it.
    fn default_data_directory(&self) -> PathBuf;

    /// Directory holding per-application save data for the game installed at
    /// `installation_dir`. Save data for an executable `Foo.exe` lives under
    /// `<root>/Foo`.
    fn save_data_root(&self, installation_dir: &Path) -> Option<PathBuf>;

    /// Best guess for the game executable, if one can be found.
    fn find_default_game_path(&self) -> Option<PathBuf>;
}

/// Secondary OS-level pointer to the data directory.
pub trait PlatformRegistry: Debug + Send + Sync {
    /// Data directory recorded by a previous run, if any.
    fn read_data_directory(&self) -> Option<PathBuf>;

    /// Records `path` as the data directory.
    ///
    /// # Errors
    ///
    /// `RegistryError::PointerCreate` / `RegistryError::PointerWrite`.
    fn write_data_directory(&self, path: &Path) -> InstallerResult<()>;

    /// Removes the pointer; a missing pointer is not an error.
    ///
    /// # Errors
    ///
    /// `RegistryError::Delete` naming the pointer step.
    fn delete(&self) -> InstallerResult<()>;
}

/// Paths implementation for the build target.
#[must_use]
pub fn current_paths() -> Arc<dyn PlatformPaths> {
    #[cfg(windows)]
    {
        Arc::new(WindowsPaths)
    }
    #[cfg(target_os = "macos")]
    {
        Arc::new(MacPaths)
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        Arc::new(LinuxPaths)
    }
}

/// Pointer implementation for the build target.
#[must_use]
pub fn current_registry() -> Arc<dyn PlatformRegistry> {
    #[cfg(windows)]
    {
        Arc::new(WindowsRegistry::default())
    }
    #[cfg(not(windows))]
    {
        Arc::new(NoRegistry)
    }
}
