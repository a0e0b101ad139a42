// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities.
//!
//! Builds zip fixtures on disk and provides in-memory platform capabilities.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{InstallerResult, RegistryError};
use crate::platform::{PlatformPaths, PlatformRegistry};

/// One entry of a zip fixture.
pub(crate) enum Entry<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
    /// A directory stored with an explicit unix mode.
    DirMode(&'a str, u32),
    /// A file stored with an explicit unix mode.
    FileMode(&'a str, &'a [u8], u32),
}

/// Writes a deflated zip containing `entries` (in order) to `path`.
pub(crate) fn write_zip(path: &Path, entries: &[Entry<'_>]) {
    let file = std::fs::File::create(path).expect("create zip fixture");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);

    for entry in entries {
        match entry {
            Entry::Dir(name) => zip.add_directory(*name, options).expect("add directory"),
            Entry::File(name, data) => {
                zip.start_file(*name, options).expect("start file");
                zip.write_all(data).expect("write file");
            }
            Entry::DirMode(name, mode) => zip
                .add_directory(*name, options.unix_permissions(*mode))
                .expect("add directory"),
            Entry::FileMode(name, data, mode) => {
                zip.start_file(*name, options.unix_permissions(*mode))
                    .expect("start file");
                zip.write_all(data).expect("write file");
            }
        }
    }
    zip.finish().expect("finish zip fixture");
}

/// A loader payload as published for Windows.
pub(crate) fn windows_loader_zip(path: &Path) {
    write_zip(
        path,
        &[
            Entry::File("Geode.dll", b"geode"),
            Entry::File("XInput9_1_0.dll", b"proxy"),
            Entry::Dir("geode/"),
            Entry::File("geode/resources/font.png", b"png"),
        ],
    );
}

/// Platform paths rooted in a scratch directory.
#[derive(Debug, Clone)]
pub(crate) struct ScratchPaths {
    pub(crate) root: PathBuf,
    pub(crate) game: Option<PathBuf>,
}

impl ScratchPaths {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            game: None,
        }
    }
}

impl PlatformPaths for ScratchPaths {
    fn default_sdk_directory(&self) -> PathBuf {
        self.root.join("sdk")
    }

    fn default_data_directory(&self) -> PathBuf {
        self.root.join("data")
    }

    fn save_data_root(&self, _installation_dir: &Path) -> Option<PathBuf> {
        Some(self.root.join("saves"))
    }

    fn find_default_game_path(&self) -> Option<PathBuf> {
        self.game.clone()
    }
}

/// In-memory stand-in for the Windows registry pointer.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryRegistry {
    pub(crate) value: Arc<Mutex<Option<PathBuf>>>,
    pub(crate) fail_writes: bool,
}

impl PlatformRegistry for MemoryRegistry {
    fn read_data_directory(&self) -> Option<PathBuf> {
        self.value.lock().ok()?.clone()
    }

    fn write_data_directory(&self, path: &Path) -> InstallerResult<()> {
        if self.fail_writes {
            return Err(RegistryError::PointerWrite {
                message: "access denied".to_string(),
            }
            .into());
        }
        if let Ok(mut value) = self.value.lock() {
            *value = Some(path.to_path_buf());
        }
        Ok(())
    }

    fn delete(&self) -> InstallerResult<()> {
        if let Ok(mut value) = self.value.lock() {
            *value = None;
        }
        Ok(())
    }
}
