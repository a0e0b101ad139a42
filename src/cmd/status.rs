// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only commands: list, status, check, find-game.

use std::path::Path;

use anyhow::anyhow;

use crate::cmd::absolute;
use crate::error::Result;
use crate::manager::{InstallState, InstallationManager};
use crate::platform::OtherModFlags;
use crate::registry::Installation;

/// One line of `list` output.
#[must_use]
pub fn format_installation(installation: &Installation, state: InstallState) -> String {
    format!(
        "{} [{}] {}",
        installation.executable_path().display(),
        installation.executable_name(),
        state
    )
}

/// Result line of `check`.
#[must_use]
pub fn format_other_mods(dir: &Path, flags: OtherModFlags) -> String {
    if flags.is_empty() {
        format!("No other mod loaders found in {}", dir.display())
    } else {
        format!(
            "Found in {}: {}",
            dir.display(),
            flags.describe().join(", ")
        )
    }
}

/// Lists recorded installations and the SDK location.
pub fn run_list_command(manager: &InstallationManager) {
    let registry = manager.registry();

    if registry.installations().is_empty() {
        println!("No installations recorded");
    } else {
        for installation in registry.installations() {
            let state = manager.state_of(installation.executable_path());
            println!("{}", format_installation(installation, state));
        }
    }

    println!("data directory: {}", registry.data_directory().display());
    if registry.is_sdk_installed() {
        println!("SDK directory:  {}", registry.sdk_directory().display());
    }
}

/// Prints the state of one game directory.
///
/// # Errors
///
/// Returns an error if `dir` cannot be resolved.
pub fn run_status_command(manager: &InstallationManager, dir: &Path) -> Result<()> {
    let dir = absolute(dir)?;
    println!("{}: {}", dir.display(), manager.state_of(&dir));
    Ok(())
}

/// Reports other mod loaders in one game directory.
///
/// # Errors
///
/// Returns an error if `dir` cannot be resolved or is not a directory.
pub fn run_check_command(manager: &InstallationManager, dir: &Path) -> Result<()> {
    let dir = absolute(dir)?;
    if !dir.is_dir() {
        return Err(anyhow!("not a directory: {}", dir.display()));
    }
    let flags = manager.does_directory_contain_other_mods(&dir);
    println!("{}", format_other_mods(&dir, flags));
    Ok(())
}

/// Prints the detected game executable.
///
/// # Errors
///
/// Returns an error if the game was not found.
pub fn run_find_game_command(manager: &InstallationManager) -> Result<()> {
    let path = manager
        .find_default_game_path()
        .ok_or_else(|| anyhow!("Geometry Dash was not found in any Steam library"))?;
    println!("{}", path.display());
    Ok(())
}
