// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |        install / update / status
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          manager          |
//!              |  install state machine    |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!             registry     release   archive
//!          installer.json  GitHub    zip extract
//!                 |           |
//!                 v           v
//!             platform       net
//!        paths/pointer/steam HTTP/DL
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, config    |
//!   +-----------------------------------------+
//! ```

pub mod archive;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod net;
pub mod platform;
pub mod registry;
pub mod release;

#[cfg(test)]
mod test_utils;
