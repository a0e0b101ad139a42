// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   config   options, configs
//!   status   list, status, check, find-game
//!   install  install, update, uninstall, uninstall-sdk, delete-data
//!
//! Config --> build_manager() --> InstallationManager (registry loaded)
//! ```

pub mod config;
pub mod install;
pub mod progress;
pub mod status;


use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::manager::InstallationManager;
use crate::platform::{
    OverridePaths, PlatformPaths, PlatformRegistry, current_paths, current_registry,
};
use crate::registry::InstallationRegistry;
use crate::release::ReleaseFetcher;

/// Builds a manager for this platform with the configured overrides.
///
/// # Errors
///
/// Returns an error if the installation state exists but cannot be loaded.
pub fn build_manager(config: &Config) -> Result<InstallationManager> {
    let paths: Arc<dyn PlatformPaths> = Arc::new(OverridePaths::new(
        current_paths(),
        config.paths.sdk_dir.clone(),
        config.paths.data_dir.clone(),
    ));
    build_manager_with(config, paths, current_registry())
}

/// Builds a manager on explicit platform capabilities.
///
/// # Errors
///
/// Returns an error if the installation state exists but cannot be loaded.
pub fn build_manager_with(
    config: &Config,
    paths: Arc<dyn PlatformPaths>,
    pointer: Arc<dyn PlatformRegistry>,
) -> Result<InstallationManager> {
    let mut registry = InstallationRegistry::new(Arc::clone(&paths), pointer);
    registry
        .load()
        .context("failed to load installation state")?;

    let fetcher = ReleaseFetcher::builder()
        .maybe_with_user_agent(config.network.user_agent.clone())
        .maybe_with_token(config.network.token.clone())
        .build();

    Ok(InstallationManager::builder()
        .registry(registry)
        .paths(paths)
        .with_fetcher(fetcher)
        .with_loader_feed(config.feeds.loader.clone())
        .with_api_feed(config.feeds.api.clone())
        .with_api_install_name(config.api.install_name.clone())
        .build())
}

/// Resolves a user-supplied path against the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("invalid path: {}", path.display()))
}

/// Token cancelled on Ctrl-C.
#[must_use]
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling download");
            trigger.cancel();
        }
    });
    token
}
