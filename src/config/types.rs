// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! Config: GlobalConfig, FeedsConfig, NetworkConfig, PathsConfig, ApiConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::{LogFormat, LogLevel};
use crate::manager::DEFAULT_API_INSTALL_NAME;
use crate::release::{API_FEED, LOADER_FEED};

/// Global options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for stderr output (0-5).
    pub log_level: LogLevel,
    /// Log level for file output (0-5).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// `text` or `json` lines in the log file.
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::INFO,
            file_log_level: LogLevel::DEBUG,
            log_file: None,
            log_format: LogFormat::Text,
        }
    }
}

/// Release feeds of the two components.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedsConfig {
    pub loader: String,
    pub api: String,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            loader: LOADER_FEED.to_string(),
            api: API_FEED.to_string(),
        }
    }
}

/// HTTP options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Replaces the default `User-Agent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// GitHub token, sent as a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Directory overrides on top of the platform defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk_dir: Option<PathBuf>,
}

/// API component options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// File name under `geode/mods` the API is installed as.
    pub install_name: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            install_name: DEFAULT_API_INSTALL_NAME.to_string(),
        }
    }
}
