// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Install, update and uninstall the loader in game directories.
//!
//! ```text
//!                  install_loader_for            install_api_for
//!  NotInstalled ----------------------> Loader ------------------> LoaderAndApi
//!       ^                            Installed                      Installed
//!       |                                |                              |
//!       +------- uninstall_from ---------+------------------------------+
//!               (record kept, files gone; uninstall() also drops record)
//!
//! install(exe):  fetch loader -> extract -> record -> save
//!                fetch api    -> copy to geode/mods/<api name>
//! update(inst):  same, for a recorded installation
//! ```

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bon::Builder;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::archive;
use crate::error::{InstallError, InstallerResult};
use crate::platform::{LoaderLayout, OtherModFlags, PlatformPaths};
use crate::registry::{Installation, InstallationRegistry};
use crate::release::{API_FEED, AssetSelector, DownloadedAsset, LOADER_FEED, Progress, ReleaseFetcher};

/// Directory, relative to the executable directory, holding mod archives.
pub const MODS_DIR: &str = "geode/mods";

/// File name the API archive is installed under.
pub const DEFAULT_API_INSTALL_NAME: &str = "geode.api.geode";

/// Loader state of one game directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    LoaderInstalled,
    LoaderAndApiInstalled,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotInstalled => "not installed",
            Self::LoaderInstalled => "loader installed",
            Self::LoaderAndApiInstalled => "loader and API installed",
        })
    }
}

/// Runs blocking filesystem work without stalling a multi-thread runtime.
fn run_blocking<T>(work: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}

/// Owns the registry and applies loader transitions to game directories.
#[derive(Debug, Builder)]
pub struct InstallationManager {
    registry: InstallationRegistry,
    paths: Arc<dyn PlatformPaths>,
    #[builder(setters(name = with_layout), default = LoaderLayout::current())]
    layout: LoaderLayout,
    #[builder(setters(name = with_fetcher), default)]
    fetcher: ReleaseFetcher,
    #[builder(setters(name = with_loader_feed), default = LOADER_FEED.to_string())]
    loader_feed: String,
    #[builder(setters(name = with_api_feed), default = API_FEED.to_string())]
    api_feed: String,
    #[builder(setters(name = with_api_install_name), default = DEFAULT_API_INSTALL_NAME.to_string())]
    api_install_name: String,
}

impl InstallationManager {
    #[must_use]
    pub const fn registry(&self) -> &InstallationRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut InstallationRegistry {
        &mut self.registry
    }

    #[must_use]
    pub const fn layout(&self) -> &LoaderLayout {
        &self.layout
    }

    #[must_use]
    pub fn api_install_name(&self) -> &str {
        &self.api_install_name
    }

    /// Saves the registry. A failed OS pointer after a written state file
    /// is only logged.
    fn persist(&self) -> InstallerResult<()> {
        match self.registry.save() {
            Err(e) if e.is_state_persisted() => {
                warn!(error = %e, "installation state saved, OS pointer not updated");
                Ok(())
            }
            other => other,
        }
    }

    /// Extracts the loader `archive` next to `executable` and records the
    /// installation.
    ///
    /// # Errors
    ///
    /// [`InstallError::InvalidExecutable`], any [`ArchiveError`](crate::error::ArchiveError)
    /// from extraction, or a registry save error. A failed extraction leaves
    /// the registry untouched.
    pub fn install_loader_for(
        &mut self,
        executable: &Path,
        archive: &Path,
    ) -> InstallerResult<Installation> {
        let installation = Installation::from_executable(executable)?;
        let report = archive::extract(archive, installation.executable_path())?;
        info!(
            path = %installation.executable_path().display(),
            files = report.files,
            "loader installed"
        );

        if let Some(previous) = self.registry.insert(installation.clone()) {
            debug!(exe = previous.executable_name(), "replaced existing installation record");
        }
        self.persist()?;
        Ok(installation)
    }

    /// Copies the API `archive` to `<dir>/geode/mods/<filename>`, overwriting.
    ///
    /// # Errors
    ///
    /// [`InstallError::DirectoryCreate`] or [`InstallError::Copy`].
    pub fn install_api_for(
        &self,
        installation: &Installation,
        archive: &Path,
        filename: &str,
    ) -> InstallerResult<PathBuf> {
        let mods = installation.executable_path().join(MODS_DIR);
        fs::create_dir_all(&mods).map_err(|source| InstallError::DirectoryCreate {
            path: mods.clone(),
            source,
        })?;

        let target = mods.join(filename);
        fs::copy(archive, &target).map_err(|source| InstallError::Copy {
            from: archive.to_path_buf(),
            to: target.clone(),
            source,
        })?;
        info!(path = %target.display(), "API installed");
        Ok(target)
    }

    /// Removes the loader payload directory and shim files. Missing files are
    /// skipped; the registry record is kept.
    ///
    /// # Errors
    ///
    /// [`InstallError::Delete`] for the first path that could not be removed.
    pub fn uninstall_from(&self, installation: &Installation) -> InstallerResult<()> {
        let dir = installation.executable_path();

        let payload = dir.join(self.layout.payload_dir);
        if payload.is_dir() {
            fs::remove_dir_all(&payload).map_err(|e| InstallError::delete(&payload, &e))?;
            debug!(path = %payload.display(), "removed loader directory");
        }

        for shim in self.layout.shim_files {
            let path = dir.join(shim);
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed loader shim"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(InstallError::delete(&path, &e).into()),
            }
        }

        info!(path = %dir.display(), "loader uninstalled");
        Ok(())
    }

    /// Deletes `<save root>/<exe stem>/geode`.
    ///
    /// # Errors
    ///
    /// [`InstallError::NotFound`] if there is no such directory,
    /// [`InstallError::Delete`] if it cannot be removed.
    pub fn delete_save_data_from(&self, installation: &Installation) -> InstallerResult<()> {
        let root = self
            .paths
            .save_data_root(installation.executable_path())
            .ok_or_else(|| InstallError::NotFound {
                what: "save data directory".to_string(),
                path: installation.executable_path().to_path_buf(),
            })?;

        let dir = root.join(installation.executable_stem()).join("geode");
        if !dir.is_dir() {
            return Err(InstallError::NotFound {
                what: "Geode save data".to_string(),
                path: dir,
            }
            .into());
        }

        fs::remove_dir_all(&dir).map_err(|e| InstallError::delete(&dir, &e))?;
        info!(path = %dir.display(), "save data deleted");
        Ok(())
    }

    /// Other mod loaders present in `dir`.
    #[must_use]
    pub fn does_directory_contain_other_mods(&self, dir: &Path) -> OtherModFlags {
        self.layout.detect_other_mods(dir)
    }

    /// Removes the SDK tree and marks the SDK uninstalled.
    ///
    /// # Errors
    ///
    /// [`InstallError::Delete`] if the directory is missing or cannot be
    /// removed, or a registry save error.
    pub fn uninstall_sdk(&mut self) -> InstallerResult<()> {
        let sdk = self.registry.sdk_directory().to_path_buf();
        if !sdk.is_dir() {
            return Err(InstallError::Delete {
                path: sdk,
                message: "directory does not exist".to_string(),
            }
            .into());
        }

        fs::remove_dir_all(&sdk).map_err(|e| InstallError::delete(&sdk, &e))?;
        info!(path = %sdk.display(), "SDK uninstalled");

        self.registry.clear_sdk();
        self.persist()
    }

    /// State of the game directory `dir`.
    ///
    /// The API counts as installed only when `geode/mods/<api_install_name>`
    /// exists. Every Geode mod is a `.geode` archive, so other files in that
    /// directory are user mods and leave the state at
    /// [`InstallState::LoaderInstalled`].
    #[must_use]
    pub fn state_of(&self, dir: &Path) -> InstallState {
        if self.registry.get(dir).is_none() {
            InstallState::NotInstalled
        } else if dir.join(MODS_DIR).join(&self.api_install_name).is_file() {
            InstallState::LoaderAndApiInstalled
        } else {
            InstallState::LoaderInstalled
        }
    }

    /// Drops the record for `dir` and persists.
    ///
    /// # Errors
    ///
    /// Registry save errors.
    pub fn remove_installation(&mut self, dir: &Path) -> InstallerResult<Option<Installation>> {
        let removed = self.registry.remove(dir);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Uninstalls the loader files and drops the record.
    ///
    /// # Errors
    ///
    /// See [`uninstall_from`](Self::uninstall_from) and
    /// [`remove_installation`](Self::remove_installation).
    pub fn uninstall(&mut self, installation: &Installation) -> InstallerResult<()> {
        self.uninstall_from(installation)?;
        self.remove_installation(installation.executable_path())?;
        Ok(())
    }

    /// Downloads the latest loader asset for this platform.
    ///
    /// # Errors
    ///
    /// Any fetch error.
    pub async fn download_loader<P>(
        &self,
        progress: P,
        cancel: &CancellationToken,
    ) -> InstallerResult<DownloadedAsset>
    where
        P: FnMut(Progress),
    {
        self.fetcher
            .fetch_latest(
                &self.loader_feed,
                &AssetSelector::Platform(self.layout),
                progress,
                cancel,
            )
            .await
    }

    /// Downloads the latest API asset.
    ///
    /// # Errors
    ///
    /// Any fetch error.
    pub async fn download_api<P>(
        &self,
        progress: P,
        cancel: &CancellationToken,
    ) -> InstallerResult<DownloadedAsset>
    where
        P: FnMut(Progress),
    {
        self.fetcher
            .fetch_latest(&self.api_feed, &AssetSelector::API, progress, cancel)
            .await
    }

    /// Full install for `executable`: latest loader, then (with `with_api`)
    /// the latest API.
    ///
    /// # Errors
    ///
    /// The first fetch, extraction, copy or save error. If the API step
    /// fails the loader stays installed and recorded.
    pub async fn install<P>(
        &mut self,
        executable: &Path,
        with_api: bool,
        mut progress: P,
        cancel: &CancellationToken,
    ) -> InstallerResult<Installation>
    where
        P: FnMut(Progress),
    {
        let loader = self.download_loader(&mut progress, cancel).await?;
        info!(version = loader.tag(), "installing loader");
        let installation = run_blocking(|| self.install_loader_for(executable, loader.path()))?;

        if with_api {
            let api = self.download_api(&mut progress, cancel).await?;
            info!(version = api.tag(), "installing API");
            run_blocking(|| self.install_api_for(&installation, api.path(), &self.api_install_name))?;
        }
        Ok(installation)
    }

    /// Re-fetches the loader (and the API if it was installed) for a
    /// recorded installation.
    ///
    /// # Errors
    ///
    /// [`InstallError::NotFound`] if `dir` is not recorded, otherwise as
    /// [`install`](Self::install).
    pub async fn update<P>(
        &mut self,
        dir: &Path,
        progress: P,
        cancel: &CancellationToken,
    ) -> InstallerResult<InstallState>
    where
        P: FnMut(Progress),
    {
        let installation = self
            .registry
            .get(dir)
            .cloned()
            .ok_or_else(|| InstallError::NotFound {
                what: "installation".to_string(),
                path: dir.to_path_buf(),
            })?;
        let with_api = self.state_of(dir) == InstallState::LoaderAndApiInstalled;

        self.install(&installation.executable(), with_api, progress, cancel)
            .await?;
        Ok(self.state_of(dir))
    }

    /// Best guess for the game executable on this machine.
    #[must_use]
    pub fn find_default_game_path(&self) -> Option<PathBuf> {
        self.paths.find_default_game_path()
    }
}
