// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Layered configuration loading.
//!
//! ```text
//! ConfigLoader::new()
//!   .add_toml_file_optional(default)   [optional]  skipped when absent
//!   .add_toml_file(--config)           [file]      must exist
//!   .add_toml_str(text)                [inline]
//!   .with_env_prefix(GEODE_INSTALLER)  <PREFIX>_<SECTION>__<KEY>
//!   .set(key, value)                   command-line overrides
//!        |
//!        v
//!   build() --> Config (validated)
//! ```
//!
//! Sources are only recorded until `build()`, which applies them in the
//! order they were added.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Environment, File, FileFormat};

use super::Config;
use crate::error::Result;

/// One TOML layer of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A file that must exist.
    File(PathBuf),
    /// A file that is used only if it exists.
    OptionalFile(PathBuf),
    /// TOML text given directly.
    Inline(String),
}

impl ConfigSource {
    /// False for an optional file that does not exist.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::OptionalFile(path) => path.is_file(),
            Self::File(_) | Self::Inline(_) => true,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "[file] {}", path.display()),
            Self::OptionalFile(path) => write!(f, "[optional] {}", path.display()),
            Self::Inline(_) => f.write_str("[inline] <string>"),
        }
    }
}

/// Collects configuration sources and merges them into a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
    env_prefix: Option<String>,
    overrides: Vec<(String, config::Value)>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML file; `build()` fails if it is missing or invalid.
    #[must_use]
    pub fn add_toml_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources
            .push(ConfigSource::File(path.as_ref().to_path_buf()));
        self
    }

    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources
            .push(ConfigSource::OptionalFile(path.as_ref().to_path_buf()));
        self
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        self.sources.push(ConfigSource::Inline(content.to_string()));
        self
    }

    /// Reads `<PREFIX>_<SECTION>__<KEY>` environment variables on top of the
    /// files.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Overrides `key` (e.g. `global.log_level`) above every other source.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<config::Value>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// [`set`](Self::set) when `value` is present.
    #[must_use]
    pub fn set_optional<T: Into<config::Value>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Sources that will contribute to the configuration.
    #[must_use]
    pub fn loaded_sources(&self) -> Vec<&ConfigSource> {
        self.sources.iter().filter(|s| s.is_present()).collect()
    }

    /// Numbered lines for the `configs` command.
    #[must_use]
    pub fn format_loaded_files(&self) -> Vec<String> {
        self.loaded_sources()
            .into_iter()
            .enumerate()
            .map(|(i, source)| format!("{}. {source}", i + 1))
            .collect()
    }

    /// Merges all sources and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a required file is missing, a file is not valid
    /// TOML or has unknown keys, an environment variable or override does not
    /// fit its field, or [`Config::validate`] rejects a value.
    pub fn build(self) -> Result<Config> {
        let mut builder = config::Config::builder();
        for source in &self.sources {
            builder = match source {
                ConfigSource::File(path) => builder.add_source(
                    File::from(path.as_path())
                        .format(FileFormat::Toml)
                        .required(true),
                ),
                ConfigSource::OptionalFile(path) => builder.add_source(
                    File::from(path.as_path())
                        .format(FileFormat::Toml)
                        .required(false),
                ),
                ConfigSource::Inline(text) => {
                    builder.add_source(File::from_str(text, FileFormat::Toml))
                }
            };
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        for (key, value) in self.overrides {
            builder = builder
                .set_override(key.as_str(), value)
                .with_context(|| format!("invalid configuration key '{key}'"))?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
