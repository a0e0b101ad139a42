// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! # Option Precedence
//!
//! ```text
//! --config FILE      ← Additional config file (loaded after the defaults)
//! --log-level N      ← Console verbosity (0-5)
//! --file-log-level N ← File verbosity (falls back to --log-level)
//! --log-file FILE    ← Enables file logging
//! --data-dir DIR     ← paths.data_dir override
//!
//! Precedence: CLI flags > GEODE_INSTALLER_* env > --config > default files > defaults
//! ```

use clap::Args;
use std::path::PathBuf;

use crate::config::ConfigLoader;

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to an additional TOML configuration file.
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Disables auto loading of geode-installer.toml, only uses --config.
    #[arg(long = "no-default-config", global = true)]
    pub no_default_config: bool,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace).
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        global = true,
        value_parser = clap::value_parser!(u8).range(0..=5)
    )]
    pub log_level: Option<u8>,

    /// File log level, overrides --log-level for the log file.
    #[arg(
        long = "file-log-level",
        value_name = "LEVEL",
        global = true,
        value_parser = clap::value_parser!(u8).range(0..=5)
    )]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Directory holding installer.json (overrides the platform default).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Applies command-line options as configuration overrides.
    #[must_use]
    pub fn apply_overrides(&self, loader: ConfigLoader) -> ConfigLoader {
        let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());

        loader
            .set_optional("global.log_level", self.log_level.map(i64::from))
            // file_log_level falls back to log_level if not specified
            .set_optional(
                "global.file_log_level",
                self.file_log_level.or(self.log_level).map(i64::from),
            )
            .set_optional("global.log_file", path(&self.log_file))
            .set_optional("paths.data_dir", path(&self.data_dir))
    }
}
