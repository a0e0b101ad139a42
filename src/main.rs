// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Version | Options | Configs | List | Status | Check | FindGame
//!   Install | Update | Uninstall | UninstallSdk | DeleteData
//! ```

use std::process::ExitCode;

use geode_installer::cli::global::GlobalOptions;
use geode_installer::cli::{self, Command};
use geode_installer::cmd::build_manager;
use geode_installer::cmd::config::{run_configs_command, run_options_command};
use geode_installer::cmd::install::{
    run_delete_data_command, run_install_command, run_uninstall_command,
    run_uninstall_sdk_command, run_update_command,
};
use geode_installer::cmd::status::{
    run_check_command, run_find_game_command, run_list_command, run_status_command,
};
use geode_installer::config::{Config, ConfigLoader, ENV_PREFIX};
use geode_installer::logging::{LogConfig, init_logging};
use geode_installer::platform::{PlatformPaths, current_paths};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config).await
}

fn build_log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(config.global.log_file.clone())
        .with_file_format(config.global.log_format)
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: &Config) -> ExitCode {
    let silent = config.global.log_level.is_silent();

    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        Some(Command::Configs) => build_config_loader(&cli.global)
            .map(|loader| run_configs_command(&loader.format_loaded_files())),
        Some(Command::List) => build_manager(config).map(|manager| run_list_command(&manager)),
        Some(Command::Status(args)) => {
            build_manager(config).and_then(|manager| run_status_command(&manager, &args.dir))
        }
        Some(Command::Check(args)) => {
            build_manager(config).and_then(|manager| run_check_command(&manager, &args.dir))
        }
        Some(Command::FindGame) => {
            build_manager(config).and_then(|manager| run_find_game_command(&manager))
        }
        Some(Command::Install(args)) => match build_manager(config) {
            Ok(mut manager) => run_install_command(args, &mut manager, silent).await,
            Err(e) => Err(e),
        },
        Some(Command::Update(args)) => match build_manager(config) {
            Ok(mut manager) => run_update_command(args, &mut manager, silent).await,
            Err(e) => Err(e),
        },
        Some(Command::Uninstall(args)) => build_manager(config)
            .and_then(|mut manager| run_uninstall_command(args, &mut manager)),
        Some(Command::UninstallSdk) => {
            build_manager(config).and_then(|mut manager| run_uninstall_sdk_command(&mut manager))
        }
        Some(Command::DeleteData) => {
            build_manager(config).and_then(|mut manager| run_delete_data_command(&mut manager))
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> geode_installer::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        let data_dir = global
            .data_dir
            .clone()
            .unwrap_or_else(|| current_paths().default_data_directory());
        for path in Config::default_locations(&data_dir) {
            loader = loader.add_toml_file_optional(path);
        }
    }
    if let Some(path) = &global.config {
        loader = loader.add_toml_file(path);
    }
    Ok(global.apply_overrides(loader.with_env_prefix(ENV_PREFIX)))
}

fn load_config(global: &GlobalOptions) -> geode_installer::error::Result<Config> {
    build_config_loader(global)?.build()
}
