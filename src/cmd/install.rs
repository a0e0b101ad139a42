// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commands that change a game directory or the installer's own state.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use tracing::{info, warn};

use crate::cli::install::{InstallArgs, UninstallArgs, UpdateArgs};
use crate::cmd::progress::ProgressReporter;
use crate::cmd::{absolute, cancel_on_ctrl_c};
use crate::error::Result;
use crate::manager::InstallationManager;

/// Resolves the executable to install into.
fn resolve_executable(args: &InstallArgs, manager: &InstallationManager) -> Result<PathBuf> {
    let executable = match &args.executable {
        Some(path) => absolute(path)?,
        None => manager.find_default_game_path().ok_or_else(|| {
            anyhow!("Geometry Dash was not found in any Steam library, pass the executable path")
        })?,
    };
    if !executable.is_file() {
        bail!("executable not found: {}", executable.display());
    }
    Ok(executable)
}

/// Installs the loader (and API unless `--no-api`) into a game.
///
/// # Errors
///
/// Returns an error if no executable can be found, another mod loader is
/// present without `--force`, or any download/extraction step fails.
pub async fn run_install_command(
    args: &InstallArgs,
    manager: &mut InstallationManager,
    silent: bool,
) -> Result<()> {
    let executable = resolve_executable(args, manager)?;
    let dir = executable
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("executable has no directory: {}", executable.display()))?;

    // A recorded directory already contains our own loader files.
    if !args.force && manager.registry().get(&dir).is_none() {
        let flags = manager.does_directory_contain_other_mods(&dir);
        if !flags.is_empty() {
            bail!(
                "{} already contains {}; use --force to install anyway",
                dir.display(),
                flags.describe().join(", ")
            );
        }
    }

    let cancel = cancel_on_ctrl_c();
    let mut reporter = ProgressReporter::new("install", silent);
    let result = manager
        .install(&executable, !args.no_api, |p| reporter.update(&p), &cancel)
        .await;

    match result {
        Ok(installation) => {
            reporter.finish(format!(
                "installed into {}",
                installation.executable_path().display()
            ));
            info!(
                dir = %installation.executable_path().display(),
                state = %manager.state_of(installation.executable_path()),
                "installation complete"
            );
            Ok(())
        }
        Err(e) => {
            reporter.abandon();
            Err(e).with_context(|| format!("failed to install into {}", dir.display()))
        }
    }
}

/// Updates one recorded installation, or all of them.
///
/// # Errors
///
/// Returns an error if the directory is not recorded, or with the first
/// failing installation when updating all.
pub async fn run_update_command(
    args: &UpdateArgs,
    manager: &mut InstallationManager,
    silent: bool,
) -> Result<()> {
    let dirs: Vec<PathBuf> = match &args.dir {
        Some(dir) => vec![absolute(dir)?],
        None => manager
            .registry()
            .installations()
            .iter()
            .map(|i| i.executable_path().to_path_buf())
            .collect(),
    };
    if dirs.is_empty() {
        println!("No installations recorded");
        return Ok(());
    }

    let cancel = cancel_on_ctrl_c();
    for dir in dirs {
        let mut reporter = ProgressReporter::new("update", silent);
        match manager
            .update(&dir, |p| reporter.update(&p), &cancel)
            .await
        {
            Ok(state) => reporter.finish(format!("{}: {state}", dir.display())),
            Err(e) => {
                reporter.abandon();
                return Err(e).with_context(|| format!("failed to update {}", dir.display()));
            }
        }
    }
    Ok(())
}

/// Removes the loader from a recorded game directory.
///
/// # Errors
///
/// Returns an error if the directory is not recorded or removal fails.
pub fn run_uninstall_command(args: &UninstallArgs, manager: &mut InstallationManager) -> Result<()> {
    let dir = absolute(&args.dir)?;
    let installation = manager
        .registry()
        .get(&dir)
        .cloned()
        .ok_or_else(|| anyhow!("no installation recorded for {}", dir.display()))?;

    if args.save_data {
        match manager.delete_save_data_from(&installation) {
            Ok(()) => info!(dir = %dir.display(), "deleted save data"),
            Err(e) if e.is_not_found() => warn!(error = %e, "no save data to delete"),
            Err(e) => return Err(e.into()),
        }
    }

    if args.keep_record {
        manager.uninstall_from(&installation)?;
    } else {
        manager.uninstall(&installation)?;
    }
    println!("Uninstalled from {}", dir.display());
    Ok(())
}

/// Deletes the SDK directory.
///
/// # Errors
///
/// Returns an error if there is no SDK directory or it cannot be removed.
pub fn run_uninstall_sdk_command(manager: &mut InstallationManager) -> Result<()> {
    let dir = manager.registry().sdk_directory().to_path_buf();
    manager
        .uninstall_sdk()
        .with_context(|| format!("failed to remove SDK at {}", dir.display()))?;
    println!("Removed SDK at {}", dir.display());
    Ok(())
}

/// Deletes `installer.json`, the data directory and the OS pointer.
///
/// # Errors
///
/// Returns an error if any of them cannot be removed.
pub fn run_delete_data_command(manager: &mut InstallationManager) -> Result<()> {
    let dir = manager.registry().data_directory().to_path_buf();
    manager.registry_mut().delete()?;
    println!("Deleted installer data at {}", dir.display());
    Ok(())
}
