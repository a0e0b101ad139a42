// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the commands that change a game directory.
//!
//! ```text
//! install [EXE] --force --no-api   EXE defaults to the detected Steam copy
//! update [DIR]                     DIR defaults to every recorded installation
//! uninstall DIR --keep-record --save-data
//! ```

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `install` command.
#[derive(Debug, Clone, Default, Args)]
pub struct InstallArgs {
    /// Game executable. Detected from Steam when omitted.
    #[arg(value_name = "EXE")]
    pub executable: Option<PathBuf>,

    /// Install even if other mod loaders are present.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Only install the loader, not the API.
    #[arg(long = "no-api")]
    pub no_api: bool,
}

/// Arguments for the `update` command.
#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    /// Game directory to update. All recorded installations when omitted.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for the `uninstall` command.
#[derive(Debug, Clone, Default, Args)]
pub struct UninstallArgs {
    /// Game directory to uninstall from.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Remove the loader files but keep the installation record.
    #[arg(long = "keep-record")]
    pub keep_record: bool,

    /// Also delete the loader's save data for this game.
    #[arg(long = "save-data")]
    pub save_data: bool,
}

/// Arguments for commands that inspect one game directory.
#[derive(Debug, Clone, Default, Args)]
pub struct DirArgs {
    /// Game directory.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}
