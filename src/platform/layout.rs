// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! What the loader puts into a game directory, and what other tools leave
//! behind.

use std::path::Path;

use bitflags::bitflags;

bitflags! {
    /// Other mod-loading tools found in a game directory.
    ///
    /// Advisory only: the manager reports these, callers decide whether to
    /// warn or refuse.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OtherModFlags: u8 {
        /// Mega Hack v6.
        const MHV6 = 0x01;
        /// Mega Hack v7.
        const MHV7 = 0x02;
        /// GD Hacker Mode.
        const GDHM = 0x04;
        /// Some other DLL loader or leftover loader shim.
        const SOME = 0x08;
    }
}

impl OtherModFlags {
    /// Human-readable names of the detected tools.
    #[must_use]
    pub fn describe(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::MHV6) {
            names.push("Mega Hack v6");
        }
        if self.contains(Self::MHV7) {
            names.push("Mega Hack v7");
        }
        if self.contains(Self::GDHM) {
            names.push("GD Hacker Mode");
        }
        if self.contains(Self::SOME) {
            names.push("another mod loader");
        }
        names
    }
}

/// Platform layout of the loader payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderLayout {
    /// Shown in "No release asset for <name> found".
    pub platform_name: &'static str,
    /// Substring identifying this platform's loader asset in a release.
    pub asset_identifier: &'static str,
    /// Loader directory inside the executable directory.
    pub payload_dir: &'static str,
    /// Bootstrap/shim files placed next to the executable.
    pub shim_files: &'static [&'static str],
    /// Marker files of other tools, relative to the executable directory.
    pub foreign_markers: &'static [(&'static str, OtherModFlags)],
}

impl LoaderLayout {
    pub const WINDOWS: Self = Self {
        platform_name: "Windows",
        asset_identifier: "win",
        payload_dir: "geode",
        shim_files: &["XInput9_1_0.dll", "Geode.dll"],
        foreign_markers: &[
            ("absoluteldr.dll", OtherModFlags::MHV6),
            ("hackproldr.dll", OtherModFlags::MHV7),
            ("ToastedMarshmellow.dll", OtherModFlags::GDHM),
            ("Geode.dll", OtherModFlags::SOME),
            ("quickldr.dll", OtherModFlags::SOME),
            ("GDDLLLoader.dll", OtherModFlags::SOME),
            ("ModLdr.dll", OtherModFlags::SOME),
            ("minhook.dll", OtherModFlags::SOME),
            ("XInput9_1_0.dll", OtherModFlags::SOME),
        ],
    };

    /// The game binary sits in `Contents/MacOS`; the loader dylibs are
    /// placed next to it.
    pub const MACOS: Self = Self {
        platform_name: "MacOS",
        asset_identifier: "mac",
        payload_dir: "geode",
        shim_files: &["Geode.dylib", "GeodeBootstrapper.dylib"],
        foreign_markers: &[
            ("Geode.dylib", OtherModFlags::SOME),
            ("GeodeBootstrapper.dylib", OtherModFlags::SOME),
            ("../Frameworks/Geode.dylib", OtherModFlags::SOME),
        ],
    };

    /// Layout for the build target. Linux runs the Windows build through
    /// Proton.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MACOS
        } else {
            Self::WINDOWS
        }
    }

    /// Scans `dir` for the marker files of other tools.
    #[must_use]
    pub fn detect_other_mods(&self, dir: &Path) -> OtherModFlags {
        self.foreign_markers
            .iter()
            .filter(|(marker, _)| dir.join(marker).exists())
            .fold(OtherModFlags::empty(), |flags, (_, flag)| flags | *flag)
    }
}
