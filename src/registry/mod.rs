// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Installation registry: every game copy the loader was applied to, plus
//! the SDK location.
//!
//! ```text
//! new()  --> defaults from PlatformPaths (data dir, sdk dir)
//! load() --> PlatformRegistry pointer? --> data dir override
//!        --> <data dir>/installer.json?  --> sdk + installations
//! save() --> mkdir -p <data dir> --> installer.json (4-space JSON)
//!        --> PlatformRegistry pointer = <data dir>
//! delete() --> pointer --> rm -r <data dir>
//! ```
//!
//! # State file
//!
//! ```json
//! {
//!     "sdk": "C:\\Program Files\\GeodeSDK",
//!     "installations": [
//!         { "path": "D:\\Steam\\steamapps\\common\\Geometry Dash", "exe": "GeometryDash.exe" }
//!     ]
//! }
//! ```
//!
//! `sdk` missing or null means the SDK is not installed. Unknown fields are
//! ignored.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{InstallError, InstallerResult, RegistryError};
use crate::platform::{PlatformPaths, PlatformRegistry};

/// File name of the persisted state inside the data directory.
pub const STATE_FILE: &str = "installer.json";

/// One game copy with the loader applied.
///
/// Identity is the executable directory: two values with the same
/// `executable_path` are equal regardless of `executable_name`.
#[derive(Debug, Clone)]
pub struct Installation {
    executable_path: PathBuf,
    executable_name: String,
}

impl Installation {
    #[must_use]
    pub fn new(executable_path: impl Into<PathBuf>, executable_name: impl Into<String>) -> Self {
        Self {
            executable_path: executable_path.into(),
            executable_name: executable_name.into(),
        }
    }

    /// Splits a path to the game executable into directory and file name.
    ///
    /// # Errors
    ///
    /// [`InstallError::InvalidExecutable`] if `executable` has no file name
    /// or no parent directory.
    pub fn from_executable(executable: &Path) -> InstallerResult<Self> {
        let invalid = || InstallError::InvalidExecutable {
            path: executable.to_path_buf(),
        };
        let name = executable
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?;
        let dir = executable
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(invalid)?;
        Ok(Self::new(dir, name))
    }

    /// Directory containing the game executable.
    #[must_use]
    pub fn executable_path(&self) -> &Path {
        &self.executable_path
    }

    #[must_use]
    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    /// Full path to the executable.
    #[must_use]
    pub fn executable(&self) -> PathBuf {
        self.executable_path.join(&self.executable_name)
    }

    /// Executable name without its extension (`GeometryDash.exe` -> `GeometryDash`).
    #[must_use]
    pub fn executable_stem(&self) -> &str {
        Path::new(&self.executable_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.executable_name)
    }
}

impl PartialEq for Installation {
    fn eq(&self, other: &Self) -> bool {
        self.executable_path == other.executable_path
    }
}

impl Eq for Installation {}

impl PartialOrd for Installation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Installation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.executable_path.cmp(&other.executable_path)
    }
}

impl Hash for Installation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.executable_path.hash(state);
    }
}

impl Borrow<Path> for Installation {
    fn borrow(&self) -> &Path {
        &self.executable_path
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sdk: Option<PathBuf>,
    #[serde(default)]
    installations: Option<Vec<InstallationRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InstallationRecord {
    path: PathBuf,
    exe: String,
}

impl From<&Installation> for InstallationRecord {
    fn from(installation: &Installation) -> Self {
        Self {
            path: installation.executable_path.clone(),
            exe: installation.executable_name.clone(),
        }
    }
}

impl From<InstallationRecord> for Installation {
    fn from(record: InstallationRecord) -> Self {
        Self::new(record.path, record.exe)
    }
}

/// Durable set of known installations.
///
/// Construct once, call [`load`](Self::load) at startup, [`save`](Self::save)
/// after every mutation. Not synchronized: callers serialize access.
#[derive(Debug)]
pub struct InstallationRegistry {
    paths: Arc<dyn PlatformPaths>,
    pointer: Arc<dyn PlatformRegistry>,
    sdk_directory: PathBuf,
    sdk_installed: bool,
    data_directory: PathBuf,
    installations: BTreeSet<Installation>,
    data_loaded: bool,
}

impl InstallationRegistry {
    /// Creates an empty registry with the platform default directories.
    #[must_use]
    pub fn new(paths: Arc<dyn PlatformPaths>, pointer: Arc<dyn PlatformRegistry>) -> Self {
        let data_directory = paths.default_data_directory();
        let sdk_directory = paths.default_sdk_directory();
        Self {
            paths,
            pointer,
            sdk_directory,
            sdk_installed: false,
            data_directory,
            installations: BTreeSet::new(),
            data_loaded: false,
        }
    }

    fn reset(&mut self) {
        self.data_directory = self.paths.default_data_directory();
        self.sdk_directory = self.paths.default_sdk_directory();
        self.sdk_installed = false;
        self.installations.clear();
        self.data_loaded = false;
    }

    /// Loads state from the pointer and the state file.
    ///
    /// A missing state file is a fresh install, not an error. On error the
    /// installation set stays empty and the directories keep their defaults
    /// (or the pointer's data directory).
    ///
    /// # Errors
    ///
    /// [`RegistryError::Read`] or [`RegistryError::Parse`] for an unreadable
    /// or malformed state file.
    pub fn load(&mut self) -> InstallerResult<()> {
        self.reset();

        if let Some(dir) = self.pointer.read_data_directory() {
            debug!(data_dir = %dir.display(), "data directory from OS pointer");
            self.data_directory = dir;
            self.data_loaded = true;
        }

        let state_path = self.state_file_path();
        if !state_path.is_file() {
            debug!(path = %state_path.display(), "no installation state, fresh install");
            return Ok(());
        }
        self.data_loaded = true;

        let content = fs::read_to_string(&state_path).map_err(|source| RegistryError::Read {
            path: state_path.clone(),
            source,
        })?;
        let state: StateFile =
            serde_json::from_str(&content).map_err(|e| RegistryError::Parse {
                path: state_path.clone(),
                message: e.to_string(),
            })?;

        if let Some(sdk) = state.sdk {
            self.sdk_directory = sdk;
            self.sdk_installed = true;
        }
        for record in state.installations.unwrap_or_default() {
            self.installations.replace(record.into());
        }

        info!(
            path = %state_path.display(),
            installations = self.installations.len(),
            sdk_installed = self.sdk_installed,
            "installation state loaded"
        );
        Ok(())
    }

    /// Writes the state file and refreshes the OS pointer.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DirectoryCreate`] / [`RegistryError::Write`]: nothing
    ///   was persisted.
    /// - [`RegistryError::PointerCreate`] / [`RegistryError::PointerWrite`]:
    ///   the state file was written, only the pointer failed
    ///   (see [`InstallerError::is_state_persisted`](crate::error::InstallerError::is_state_persisted)).
    pub fn save(&self) -> InstallerResult<()> {
        if !self.data_directory.is_dir() {
            fs::create_dir_all(&self.data_directory).map_err(|source| {
                RegistryError::DirectoryCreate {
                    path: self.data_directory.clone(),
                    source,
                }
            })?;
        }

        let state_path = self.state_file_path();
        let state = StateFile {
            sdk: self.sdk_installed.then(|| self.sdk_directory.clone()),
            installations: Some(self.installations.iter().map(Into::into).collect()),
        };

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        state
            .serialize(&mut serializer)
            .map_err(|e| RegistryError::Write {
                path: state_path.clone(),
                source: std::io::Error::other(e),
            })?;

        fs::write(&state_path, &buffer).map_err(|source| RegistryError::Write {
            path: state_path.clone(),
            source,
        })?;
        debug!(path = %state_path.display(), "installation state saved");

        self.pointer.write_data_directory(&self.data_directory)
    }

    /// Removes the OS pointer and the whole data directory, then resets to
    /// defaults.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Delete`] naming the step that failed.
    pub fn delete(&mut self) -> InstallerResult<()> {
        self.pointer.delete()?;

        if self.data_directory.exists() {
            fs::remove_dir_all(&self.data_directory).map_err(|e| RegistryError::Delete {
                step: format!("data directory {}", self.data_directory.display()),
                message: e.to_string(),
            })?;
        }
        info!(data_dir = %self.data_directory.display(), "installer data deleted");

        self.reset();
        Ok(())
    }

    /// True when neither a pointer nor a state file was found by `load`.
    #[must_use]
    pub const fn is_first_time(&self) -> bool {
        !self.data_loaded
    }

    #[must_use]
    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    #[must_use]
    pub fn state_file_path(&self) -> PathBuf {
        self.data_directory.join(STATE_FILE)
    }

    #[must_use]
    pub fn sdk_directory(&self) -> &Path {
        &self.sdk_directory
    }

    #[must_use]
    pub const fn is_sdk_installed(&self) -> bool {
        self.sdk_installed
    }

    /// Records the SDK as installed at `path`.
    pub fn set_sdk_directory(&mut self, path: impl Into<PathBuf>) {
        self.sdk_directory = path.into();
        self.sdk_installed = true;
    }

    /// Marks the SDK as not installed and restores the default directory.
    pub fn clear_sdk(&mut self) {
        self.sdk_directory = self.paths.default_sdk_directory();
        self.sdk_installed = false;
    }

    #[must_use]
    pub const fn installations(&self) -> &BTreeSet<Installation> {
        &self.installations
    }

    #[must_use]
    pub fn get(&self, executable_path: &Path) -> Option<&Installation> {
        self.installations.get(executable_path)
    }

    /// Inserts `installation`, replacing any record with the same path.
    /// Returns the replaced record.
    pub fn insert(&mut self, installation: Installation) -> Option<Installation> {
        self.installations.replace(installation)
    }

    /// Removes the record for `executable_path`.
    pub fn remove(&mut self, executable_path: &Path) -> Option<Installation> {
        self.installations.take(executable_path)
    }
}
