// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Steam library lookup for the default game location.
//!
//! ```text
//! steam roots --> <root>/steamapps/common/Geometry Dash/<exe>
//!      |
//!      +--> config/config.vdf           "BaseInstallFolder_N"  "D:\\Games"
//!      +--> steamapps/libraryfolders.vdf "path"                 "/mnt/games"
//!                |
//!                v
//!           <library>/steamapps/common/Geometry Dash/<exe>
//! ```
//!
//! The VDF files are only scanned line by line for the two keys above.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Game directory inside a Steam library.
pub const GAME_DIR: &str = "steamapps/common/Geometry Dash";

/// Steam app id of the game, used for Proton prefixes.
pub const GAME_APP_ID: &str = "322170";

/// Finds `<library>/GAME_DIR/<executable>` in the given Steam roots and the
/// libraries they reference.
#[must_use]
pub fn find_game(steam_roots: &[PathBuf], executable: &Path) -> Option<PathBuf> {
    for root in steam_roots {
        let mut libraries = vec![root.clone()];
        libraries.extend(library_folders(root));

        for library in libraries {
            let candidate = library.join(GAME_DIR).join(executable);
            debug!(candidate = %candidate.display(), "probing for game executable");
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Additional library folders configured in a Steam root.
#[must_use]
pub fn library_folders(steam_root: &Path) -> Vec<PathBuf> {
    let mut folders = Vec::new();

    if let Ok(config) = fs::read_to_string(steam_root.join("config").join("config.vdf")) {
        folders.extend(
            config
                .lines()
                .filter(|line| line.contains("BaseInstallFolder_"))
                .filter_map(last_quoted_value)
                .map(PathBuf::from),
        );
    }

    if let Ok(libraries) =
        fs::read_to_string(steam_root.join("steamapps").join("libraryfolders.vdf"))
    {
        folders.extend(
            libraries
                .lines()
                .filter(|line| line.trim_start().starts_with("\"path\""))
                .filter_map(last_quoted_value)
                .map(PathBuf::from),
        );
    }

    folders.dedup();
    folders
}

/// Value of a `"key"  "value"` VDF line, with escaped backslashes folded.
fn last_quoted_value(line: &str) -> Option<String> {
    let end = line.rfind('"')?;
    let start = line[..end].rfind('"')? + 1;
    let value = &line[start..end];
    if value.is_empty() {
        return None;
    }

    let mut value = value.to_string();
    while value.contains("\\\\") {
        value = value.replace("\\\\", "\\");
    }
    Some(value)
}

/// Steam install directory on Windows, from the registry.
#[cfg(windows)]
#[must_use]
pub fn steam_roots() -> Vec<PathBuf> {
    use winreg::RegKey;
    use winreg::enums::HKEY_LOCAL_MACHINE;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    [r"SOFTWARE\WOW6432Node\Valve\Steam", r"SOFTWARE\Valve\Steam"]
        .iter()
        .filter_map(|subkey| hklm.open_subkey(subkey).ok())
        .filter_map(|key| key.get_value::<String, _>("InstallPath").ok())
        .map(PathBuf::from)
        .collect()
}

/// Well-known Steam install directories on macOS.
#[cfg(target_os = "macos")]
#[must_use]
pub fn steam_roots() -> Vec<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("Steam"))
        .into_iter()
        .collect()
}

/// Well-known Steam install directories on Linux (native and Flatpak).
#[cfg(not(any(windows, target_os = "macos")))]
#[must_use]
pub fn steam_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".steam").join("steam"));
        roots.push(
            home.join(".var/app/com.valvesoftware.Steam/data")
                .join("Steam"),
        );
    }
    if let Some(data) = dirs::data_dir() {
        roots.push(data.join("Steam"));
    }
    roots.retain(|root| root.is_dir());
    roots
}
