// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Default directories per platform.
//!
//! ```text
//!            sdk                         data                      saves
//! Windows    %ProgramFiles%\GeodeSDK     %LOCALAPPDATA%\GeodeSDK   %LOCALAPPDATA%
//! MacOS      ~/Library/App Support/GeodeSDK (both)                 ~/Library/App Support
//! Linux      $XDG_DATA_HOME/GeodeSDK (both)                        Proton prefix LocalAppData
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::steam::{self, GAME_APP_ID};
use super::{GEODE_DIR_NAME, PlatformPaths};

fn or_temp(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(std::env::temp_dir)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPaths;

impl WindowsPaths {
    const EXECUTABLE: &'static str = "GeometryDash.exe";
}

impl PlatformPaths for WindowsPaths {
    fn default_sdk_directory(&self) -> PathBuf {
        std::env::var_os("ProgramFiles")
            .map_or_else(|| PathBuf::from(r"C:\Program Files"), PathBuf::from)
            .join(GEODE_DIR_NAME)
    }

    fn default_data_directory(&self) -> PathBuf {
        or_temp(dirs::data_local_dir()).join(GEODE_DIR_NAME)
    }

    fn save_data_root(&self, _installation_dir: &Path) -> Option<PathBuf> {
        dirs::data_local_dir()
    }

    fn find_default_game_path(&self) -> Option<PathBuf> {
        steam::find_game(&steam::steam_roots(), Path::new(Self::EXECUTABLE))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MacPaths;

impl MacPaths {
    const EXECUTABLE: &'static str = "Geometry Dash.app/Contents/MacOS/Geometry Dash";
}

impl PlatformPaths for MacPaths {
    fn default_sdk_directory(&self) -> PathBuf {
        or_temp(dirs::data_dir()).join(GEODE_DIR_NAME)
    }

    fn default_data_directory(&self) -> PathBuf {
        self.default_sdk_directory()
    }

    fn save_data_root(&self, _installation_dir: &Path) -> Option<PathBuf> {
        dirs::data_dir()
    }

    fn find_default_game_path(&self) -> Option<PathBuf> {
        steam::find_game(&steam::steam_roots(), Path::new(Self::EXECUTABLE))
    }
}

/// Linux runs the Windows build through Proton, so saves live in the
/// game's Wine prefix next to the Steam library.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxPaths;

impl LinuxPaths {
    const EXECUTABLE: &'static str = "GeometryDash.exe";
    const PREFIX_LOCAL_APPDATA: &'static str =
        "pfx/drive_c/users/steamuser/AppData/Local";

    /// `<library>/steamapps/common/Geometry Dash` ->
    /// `<library>/steamapps/compatdata/322170/pfx/.../AppData/Local`.
    fn proton_local_appdata(installation_dir: &Path) -> Option<PathBuf> {
        let steamapps = installation_dir.parent()?.parent()?;
        Some(
            steamapps
                .join("compatdata")
                .join(GAME_APP_ID)
                .join(Self::PREFIX_LOCAL_APPDATA),
        )
    }
}

impl PlatformPaths for LinuxPaths {
    fn default_sdk_directory(&self) -> PathBuf {
        or_temp(dirs::data_dir()).join(GEODE_DIR_NAME)
    }

    fn default_data_directory(&self) -> PathBuf {
        or_temp(dirs::data_local_dir()).join(GEODE_DIR_NAME)
    }

    fn save_data_root(&self, installation_dir: &Path) -> Option<PathBuf> {
        Self::proton_local_appdata(installation_dir)
    }

    fn find_default_game_path(&self) -> Option<PathBuf> {
        steam::find_game(&steam::steam_roots(), Path::new(Self::EXECUTABLE))
    }
}

/// Applies `[paths]` overrides from the configuration on top of a platform.
#[derive(Debug, Clone)]
pub struct OverridePaths {
    inner: Arc<dyn PlatformPaths>,
    sdk_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
}

impl OverridePaths {
    #[must_use]
    pub fn new(
        inner: Arc<dyn PlatformPaths>,
        sdk_dir: Option<PathBuf>,
        data_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            inner,
            sdk_dir,
            data_dir,
        }
    }
}

impl PlatformPaths for OverridePaths {
    fn default_sdk_directory(&self) -> PathBuf {
        self.sdk_dir
            .clone()
            .unwrap_or_else(|| self.inner.default_sdk_directory())
    }

    fn default_data_directory(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| self.inner.default_data_directory())
    }

    fn save_data_root(&self, installation_dir: &Path) -> Option<PathBuf> {
        self.inner.save_data_root(installation_dir)
    }

    fn find_default_game_path(&self) -> Option<PathBuf> {
        self.inner.find_default_game_path()
    }
}
