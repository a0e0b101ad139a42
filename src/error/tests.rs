// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use super::{
    ArchiveError, InstallError, InstallerError, InstallerResult, NetworkError, RegistryError,
};

#[test]
fn test_network_error_display() {
    let err = NetworkError::HttpStatus {
        status: 404,
        url: "https://example.com/feed".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"web request returned 404: https://example.com/feed");

    let err = NetworkError::Parse {
        message: "expected value at line 1 column 1".to_string(),
    };
    insta::assert_snapshot!(err.to_string(), @"unable to parse JSON: expected value at line 1 column 1");
}

#[test]
fn test_archive_read_error_names_entry() {
    let err = ArchiveError::Read {
        entry: "geode/loader.dll".to_string(),
        message: "corrupt deflate stream".to_string(),
    };
    assert!(err.to_string().contains("\"geode/loader.dll\""));
}

#[test]
fn test_pointer_errors_report_state_persisted() {
    let pointer: InstallerError = RegistryError::PointerWrite {
        message: "access denied".to_string(),
    }
    .into();
    assert!(pointer.is_state_persisted());

    let write: InstallerError = RegistryError::Write {
        path: PathBuf::from("/data/installer.json"),
        source: std::io::Error::other("disk full"),
    }
    .into();
    assert!(!write.is_state_persisted());
}

#[test]
fn test_cancelled_detection() {
    let err: InstallerError = NetworkError::Cancelled.into();
    assert!(err.is_cancelled());
    assert!(!InstallerError::other("boom").is_cancelled());
}

#[test]
fn test_not_found_detection() {
    let err: InstallerError = InstallError::NotFound {
        what: "Geode save data".to_string(),
        path: PathBuf::from("/saves/GeometryDash/geode"),
    }
    .into();
    assert!(err.is_not_found());
    insta::assert_snapshot!(err.to_string(), @"install error: Geode save data not found: /saves/GeometryDash/geode");

    let delete: InstallerError = InstallError::Delete {
        path: PathBuf::from("/sdk"),
        message: "directory does not exist".to_string(),
    }
    .into();
    assert!(!delete.is_not_found());
}

#[test]
fn test_installer_error_size() {
    let size = std::mem::size_of::<InstallerError>();
    assert!(size <= 24, "InstallerError is {size} bytes, expected <= 24");
}

#[test]
fn test_installer_result_size() {
    let size = std::mem::size_of::<InstallerResult<()>>();
    assert!(size <= 24, "InstallerResult<()> is {size} bytes, expected <= 24");
}
