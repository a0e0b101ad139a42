// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. geode-installer.toml (platform data dir)
//! 3. geode-installer.toml (cwd)
//! 4. --config
//! 5. GEODE_INSTALLER_* env vars
//! 6. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! GEODE_INSTALLER_FEEDS__LOADER=https://...   → feeds.loader
//! GEODE_INSTALLER_NETWORK__TOKEN=ghp_...      → network.token
//! GEODE_INSTALLER_PATHS__DATA_DIR=/path       → paths.data_dir
//! GEODE_INSTALLER_GLOBAL__LOG_LEVEL=4         → global.log_level
//!
//! The longer prefix keeps unrelated variables such as `GEODE_SDK` out.
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub use loader::{ConfigLoader, ConfigSource};
use types::{ApiConfig, FeedsConfig, GlobalConfig, NetworkConfig, PathsConfig};

/// File name looked up in the default locations.
pub const CONFIG_FILE_NAME: &str = "geode-installer.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "GEODE_INSTALLER";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Release feeds.
    pub feeds: FeedsConfig,
    /// HTTP options.
    pub network: NetworkConfig,
    /// Directory overrides.
    pub paths: PathsConfig,
    /// API component options.
    pub api: ApiConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use geode_installer::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("geode-installer.toml")
    ///     .with_env_prefix("GEODE_INSTALLER")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Default lookup locations, lowest priority first.
    #[must_use]
    pub fn default_locations(data_directory: &Path) -> Vec<PathBuf> {
        vec![
            data_directory.join(CONFIG_FILE_NAME),
            PathBuf::from(CONFIG_FILE_NAME),
        ]
    }

    /// Validate values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` for a feed that is not an http(s) URL or an
    /// API install name that is empty or contains a path separator.
    pub fn validate(&self) -> Result<()> {
        for (key, url) in [("loader", &self.feeds.loader), ("api", &self.feeds.api)] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidValue {
                    section: "feeds".to_string(),
                    key: key.to_string(),
                    message: format!("expected an http(s) URL, got '{url}'"),
                }
                .into());
            }
        }

        let name = &self.api.install_name;
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                section: "api".to_string(),
                key: "install_name".to_string(),
                message: format!("expected a plain file name, got '{name}'"),
            }
            .into());
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Secrets are shown as `[hidden]`. Output is sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let fmt = |p: &Option<PathBuf>| {
            p.as_ref()
                .map_or_else(String::new, |p| p.display().to_string())
        };

        let mut options = BTreeMap::new();
        options.insert("global.log_level", self.global.log_level.as_u8().to_string());
        options.insert(
            "global.file_log_level",
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert("global.log_file", fmt(&self.global.log_file));
        options.insert("global.log_format", self.global.log_format.to_string());
        options.insert("feeds.loader", self.feeds.loader.clone());
        options.insert("feeds.api", self.feeds.api.clone());
        options.insert(
            "network.user_agent",
            self.network.user_agent.clone().unwrap_or_default(),
        );
        if self.network.token.is_some() {
            options.insert("network.token", "[hidden]".to_string());
        }
        options.insert("paths.data_dir", fmt(&self.paths.data_dir));
        options.insert("paths.sdk_dir", fmt(&self.paths.sdk_dir));
        options.insert("api.install_name", self.api.install_name.clone());

        let max_key_len = options.keys().map(|k| k.len()).max().unwrap_or(0);
        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}
