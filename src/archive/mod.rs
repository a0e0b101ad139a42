// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Zip archive extraction.
//!
//! ```text
//! archive.zip --> ZipArchive --> entry 0..n (archive order)
//!                                  |
//!                   dir?  -------> create_dir_all + mode
//!                   file? -------> parent dir, create, copy + mode
//! ```
//!
//! Extraction is blocking and not transactional: the first failing entry
//! aborts, whatever was written before stays on disk.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{ArchiveError, InstallerResult};

/// Counts of what an extraction wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub files: usize,
    pub directories: usize,
}

/// Extracts every entry of the zip at `archive` into `destination`.
///
/// Later entries overwrite earlier files with the same path, and extracting
/// the same archive twice yields the same tree.
///
/// # Errors
///
/// - [`ArchiveError::Open`] if the archive is missing or not a valid zip.
/// - [`ArchiveError::Read`] if an entry cannot be decoded or its name
///   escapes `destination`.
/// - [`ArchiveError::Write`] if a destination file or directory cannot be
///   created or written.
pub fn extract(archive: &Path, destination: &Path) -> InstallerResult<ExtractReport> {
    let file = File::open(archive).map_err(|e| ArchiveError::Open {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| ArchiveError::Open {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;

    debug!(
        archive = %archive.display(),
        destination = %destination.display(),
        entries = zip.len(),
        "extracting archive"
    );

    let mut report = ExtractReport::default();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| ArchiveError::Read {
            entry: format!("#{index}"),
            message: e.to_string(),
        })?;

        let name = entry.name().to_string();
        let relative = entry.enclosed_name().ok_or_else(|| ArchiveError::Read {
            entry: name.clone(),
            message: "entry path escapes the destination directory".to_string(),
        })?;
        let target = destination.join(relative);
        let mode = entry.unix_mode();

        if entry.is_dir() {
            create_dir(&target)?;
            // The owner keeps full access so children and later runs can write.
            apply_mode(&target, mode.map(|m| m | 0o700))?;
            report.directories += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            create_dir(parent)?;
        }

        make_writable(&target)?;
        let out = File::create(&target).map_err(|source| ArchiveError::Write {
            path: target.clone(),
            source,
        })?;
        let mut out = BufWriter::new(out);

        io::copy(&mut entry, &mut out).map_err(|e| classify_copy_error(&name, &target, e))?;
        out.flush().map_err(|source| ArchiveError::Write {
            path: target.clone(),
            source,
        })?;
        drop(out);

        apply_mode(&target, mode)?;
        report.files += 1;
    }

    info!(
        archive = %archive.display(),
        destination = %destination.display(),
        files = report.files,
        directories = report.directories,
        "archive extracted"
    );

    Ok(report)
}

fn create_dir(path: &Path) -> Result<(), ArchiveError> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// `io::copy` mixes read and write failures; the zip reader reports its
/// decoding problems as `InvalidData`/`UnexpectedEof`.
fn classify_copy_error(entry: &str, target: &Path, err: io::Error) -> ArchiveError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => ArchiveError::Read {
            entry: entry.to_string(),
            message: err.to_string(),
        },
        _ => ArchiveError::Write {
            path: target.to_path_buf(),
            source: err,
        },
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<(), ArchiveError> {
    use std::os::unix::fs::PermissionsExt;

    // Entries written by non-unix tools carry no mode.
    let Some(mode) = mode.map(|m| m & 0o7777).filter(|m| *m != 0) else {
        return Ok(());
    };
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
        ArchiveError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Lifts a stored read-only mode from an existing file before it is
/// overwritten.
#[cfg(unix)]
fn make_writable(path: &Path) -> Result<(), ArchiveError> {
    use std::os::unix::fs::PermissionsExt;

    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    let mode = metadata.permissions().mode();
    if !metadata.is_file() || mode & 0o200 != 0 {
        return Ok(());
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o200)).map_err(|source| {
        ArchiveError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn make_writable(path: &Path) -> Result<(), ArchiveError> {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    if !metadata.is_file() || !metadata.permissions().readonly() {
        return Ok(());
    }
    let mut permissions = metadata.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions).map_err(|source| ArchiveError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<(), ArchiveError> {
    Ok(())
}
