// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            InstallerError (~24 bytes)
//!                     |
//!   +--------+--------+--------+--------+-------+
//!   |        |        |        |        |       |
//!   v        v        v        v        v       v
//! Network  Archive Registry Install  Config  Io/Other
//!   Box      Box      Box      Box      Box   Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Network   RequestCreation, HttpStatus, Unauthorized, Cancelled,
//!             RequestFailed, Parse, NoMatchingAsset
//!   Archive   Open, Read, Write
//!   Registry  DirectoryCreate, Read, Parse, Write,
//!             PointerCreate, PointerWrite, Delete
//!   Install   DirectoryCreate, Copy, Delete, NotFound, InvalidExecutable
//!   Config    ParseError, InvalidValue, NotFound
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`InstallerError`].
pub type InstallerResult<T> = std::result::Result<T, InstallerError>;

/// Top-level error type for the installer core.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Release feed or download failed.
    #[error("network error: {0}")]
    Network(#[from] Box<NetworkError>),

    /// Archive extraction failed.
    #[error("archive error: {0}")]
    Archive(#[from] Box<ArchiveError>),

    /// Installation registry could not be loaded, saved or deleted.
    #[error("registry error: {0}")]
    Registry(#[from] Box<RegistryError>),

    /// Install/uninstall operation on a game directory failed.
    #[error("install error: {0}")]
    Install(#[from] Box<InstallError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl InstallerError {
    /// Create a generic [`InstallerError::Other`].
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into().into_boxed_str())
    }

    /// True if this error was raised after the state file had already been
    /// written (only the secondary OS pointer failed).
    #[must_use]
    pub fn is_state_persisted(&self) -> bool {
        matches!(self, Self::Registry(e) if e.is_pointer_error())
    }

    /// True if this error reports a cancelled download.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Network(e) if matches!(**e, NetworkError::Cancelled))
    }

    /// True if an expected directory was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Install(e) if matches!(**e, InstallError::NotFound { .. }))
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for InstallerError {
                fn from(err: $error) -> Self {
                    InstallerError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    NetworkError => Network,
    ArchiveError => Archive,
    RegistryError => Registry,
    InstallError => Install,
    ConfigError => Config,
    std::io::Error => Io,
}

// --- Network Errors ---

/// Release feed and download errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request could not be built (bad URL, bad header).
    #[error("unable to create web request for {url}: {message}")]
    RequestCreation { url: String, message: String },

    /// Server answered with something other than 200.
    #[error("web request returned {status}: {url}")]
    HttpStatus { status: u16, url: String },

    /// Server answered 401.
    #[error("unauthorized to do web request: {url}")]
    Unauthorized { url: String },

    /// Request was cancelled through its cancellation token.
    #[error("web request cancelled")]
    Cancelled,

    /// Transport-level failure.
    #[error("web request failed: {url}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Release metadata was not valid JSON of the expected shape.
    #[error("unable to parse JSON: {message}")]
    Parse { message: String },

    /// No asset in the release matched the selector.
    #[error("{message}")]
    NoMatchingAsset { message: String },

    /// Writing the downloaded body failed.
    #[error("io error during download of {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// --- Archive Errors ---

/// Archive extraction errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Archive missing, unreadable or not a zip.
    #[error("unable to open archive {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// Entry data could not be streamed.
    #[error("unable to read the archive entry \"{entry}\": {message}")]
    Read { entry: String, message: String },

    /// Destination file or directory could not be created or written.
    #[error("unable to create file \"{path}\": {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// --- Registry Errors ---

/// Installation registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Data directory could not be created.
    #[error("unable to create data directory at {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file exists but could not be read.
    #[error("unable to load installation info from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file is not valid JSON of the expected shape.
    #[error("unable to load installation info from {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// State file could not be written.
    #[error("can't save file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// OS pointer key could not be created.
    #[error("unable to create registry key, uninstalling will not find the data directory: {message}")]
    PointerCreate { message: String },

    /// OS pointer value could not be written.
    #[error("unable to save registry key, uninstalling will not find the data directory: {message}")]
    PointerWrite { message: String },

    /// A delete step failed.
    #[error("unable to delete {step}: {message}")]
    Delete { step: String, message: String },
}

impl RegistryError {
    /// Pointer failures happen after the state file was written.
    #[must_use]
    pub const fn is_pointer_error(&self) -> bool {
        matches!(self, Self::PointerCreate { .. } | Self::PointerWrite { .. })
    }
}

// --- Install Errors ---

/// Errors from install/uninstall operations on a game directory.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Directory could not be created.
    #[error("unable to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be copied into place.
    #[error("unable to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path could not be deleted, or is missing where a delete was requested.
    #[error("unable to delete {path}: {message}")]
    Delete { path: PathBuf, message: String },

    /// Expected directory does not exist.
    #[error("{what} not found: {path}")]
    NotFound { what: String, path: PathBuf },

    /// Path does not name an executable inside a directory.
    #[error("not a game executable path: {path}")]
    InvalidExecutable { path: PathBuf },
}

impl InstallError {
    pub(crate) fn delete(path: &Path, err: &std::io::Error) -> Self {
        Self::Delete {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Configuration file not found.
    #[error("config file not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests;
