// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Terminal rendering of download progress.
//!
//! ```text
//! Progress { label, percent }
//!   "Downloading", n      -> bar   [####>----] 42%
//!   "Beginning download"  -> spinner
//!   other labels          -> message line
//! ```

use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::release::Progress;

/// Pre-validated progress bar style for known sizes.
fn bar_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        })
        .clone()
}

/// Pre-validated spinner style for unknown sizes and waiting phases.
fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        })
        .clone()
}

/// Renders a stream of [`Progress`] values on stderr.
pub struct ProgressReporter {
    bar: ProgressBar,
    silent: bool,
    title: String,
    version: String,
}

impl ProgressReporter {
    /// Reporter titled `title` (e.g. "install"); `silent` draws nothing.
    #[must_use]
    pub fn new(title: impl Into<String>, silent: bool) -> Self {
        let bar = if silent {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            bar,
            silent,
            title: title.into(),
            version: String::new(),
        }
    }

    pub fn update(&mut self, progress: &Progress) {
        if self.silent {
            return;
        }
        if progress.label.starts_with("Downloading version") {
            // A new component: back to a spinner until its size is known.
            self.bar.set_style(spinner_style());
            self.bar.unset_length();
            self.bar.set_position(0);
            self.version = progress.label.clone();
        }

        if progress.label == Progress::downloading(0).label {
            if self.bar.length().is_none() {
                self.bar.set_style(bar_style());
                self.bar.set_length(100);
            }
            self.bar.set_position(u64::from(progress.percent));
            self.bar.set_message(format!("{}: {}", self.title, self.version));
        } else {
            self.bar.set_message(format!("{}: {}", self.title, progress.label));
        }
    }

    pub fn finish(&self, message: impl Into<String>) {
        let message = message.into();
        if self.silent {
            return;
        }
        self.bar.set_style(spinner_style());
        self.bar.finish_with_message(message);
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
