// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! geode-installer [global options] <command>
//! version | options | configs
//! list | status DIR | check DIR | find-game
//! install [EXE] | update [DIR] | uninstall DIR
//! uninstall-sdk | delete-data
//! ```

pub mod global;
pub mod install;


use crate::cli::global::GlobalOptions;
use crate::cli::install::{DirArgs, InstallArgs, UninstallArgs, UpdateArgs};
use clap::{Parser, Subcommand};

/// Geode Installer
///
/// Installs and manages the Geode mod loader for Geometry Dash.
#[derive(Debug, Parser)]
#[command(
    name = "geode-installer",
    author,
    version,
    about = "Geode mod loader installer",
    long_about = "geode-installer Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Installs the Geode mod loader and its API into Geometry Dash\n\
                  and keeps track of every installation so it can be updated or\n\
                  removed later. Run `geode-installer install` to install into the\n\
                  copy found in your Steam library.",
    after_help = "CONFIG FILES:\n\n\
                  geode-installer.toml is looked up in the installer data\n\
                  directory and then in the current directory; the latter\n\
                  overrides the former. --config adds one more file on top.\n\
                  GEODE_INSTALLER_<SECTION>__<KEY> environment variables\n\
                  override files.\n\
                  Use --no-default-config to only use --config."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files in use.
    Configs,

    /// Lists recorded installations and their state.
    List,

    /// Shows the loader state of a game directory.
    Status(DirArgs),

    /// Checks a game directory for other mod loaders.
    Check(DirArgs),

    /// Prints the detected game executable.
    #[command(name = "find-game")]
    FindGame,

    /// Installs the loader (and the API) into a game.
    Install(InstallArgs),

    /// Re-installs the latest loader into recorded installations.
    Update(UpdateArgs),

    /// Removes the loader from a game directory.
    Uninstall(UninstallArgs),

    /// Deletes the SDK directory.
    #[command(name = "uninstall-sdk")]
    UninstallSdk,

    /// Deletes the installer's own data (installer.json and pointer).
    #[command(name = "delete-data")]
    DeleteData,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
