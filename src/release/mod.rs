// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Latest-release resolution and asset download.
//!
//! ```text
//! fetch_latest(feed_url, selector)
//!   GET feed_url ----------------> { "tag_name", "assets": [...] }
//!   ("Downloading version <tag>", 0)
//!   selector.select(assets) -----> first matching name, else NoMatchingAsset
//!   ("Waiting", 0)
//!   GET browser_download_url ----> temp file (streamed)
//!   ("Downloading", n%) ...      | ("Beginning download", 0) if size unknown
//!   DownloadedAsset { tag, name, TempPath }
//!
//! spawn_latest() -> FetchHandle
//!   tokio task --flume--> FetchEvent::{Progress, Failed, Completed}
//!   cancel() -> CancellationToken -> Failed(Cancelled)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use bon::Builder;
use serde::Deserialize;
use tempfile::TempPath;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{InstallerError, InstallerResult, NetworkError};
use crate::net::Downloader;
use crate::platform::LoaderLayout;

/// Default feed for the loader component.
pub const LOADER_FEED: &str = "https://api.github.com/repos/geode-sdk/loader/releases/latest";

/// Default feed for the API component.
pub const API_FEED: &str = "https://api.github.com/repos/geode-sdk/api/releases/latest";

/// Release metadata as served by the GitHub releases API.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Picks the asset to download out of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSelector {
    /// Loader asset: name contains the layout's platform identifier.
    Platform(LoaderLayout),
    /// Name contains the given marker (`.geode` for the API).
    Extension(&'static str),
}

impl AssetSelector {
    /// Selector for the API component.
    pub const API: Self = Self::Extension(".geode");

    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Platform(layout) => name.contains(layout.asset_identifier),
            Self::Extension(marker) => name.contains(marker),
        }
    }

    /// Message reported when no asset matches.
    #[must_use]
    pub fn missing_message(&self) -> String {
        match self {
            Self::Platform(layout) => {
                format!("No release asset for {} found", layout.platform_name)
            }
            Self::Extension(marker) => format!("No {marker} file release asset found"),
        }
    }

    /// First asset of `release` whose name matches, in release order.
    ///
    /// # Errors
    ///
    /// [`NetworkError::NoMatchingAsset`] if none matches.
    pub fn select<'a>(&self, release: &'a Release) -> InstallerResult<&'a ReleaseAsset> {
        release
            .assets
            .iter()
            .find(|asset| self.matches(&asset.name))
            .ok_or_else(|| {
                NetworkError::NoMatchingAsset {
                    message: self.missing_message(),
                }
                .into()
            })
    }
}

/// A progress notification: phase label plus percentage (0..=100).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub label: String,
    pub percent: u8,
}

impl Progress {
    #[must_use]
    pub fn new(label: impl Into<String>, percent: u8) -> Self {
        Self {
            label: label.into(),
            percent: percent.min(100),
        }
    }

    #[must_use]
    pub fn version(tag: &str) -> Self {
        Self::new(format!("Downloading version {tag}"), 0)
    }

    #[must_use]
    pub fn waiting() -> Self {
        Self::new("Waiting", 0)
    }

    #[must_use]
    pub fn downloading(percent: u8) -> Self {
        Self::new("Downloading", percent)
    }

    #[must_use]
    pub fn beginning() -> Self {
        Self::new("Beginning download", 0)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.label, self.percent)
    }
}

/// Turns byte counts into de-duplicated, non-decreasing [`Progress`] values.
#[derive(Debug, Default)]
pub(crate) struct DownloadProgress {
    last_percent: Option<u8>,
    size_known: bool,
    announced_unknown: bool,
}

impl DownloadProgress {
    pub(crate) fn update(&mut self, downloaded: u64, total: Option<u64>) -> Option<Progress> {
        let Some(total) = total else {
            if self.announced_unknown {
                return None;
            }
            self.announced_unknown = true;
            return Some(Progress::beginning());
        };

        self.size_known = true;
        let percent = percent_of(downloaded, total);
        if self.last_percent.is_some_and(|last| last >= percent) {
            return None;
        }
        self.last_percent = Some(percent);
        Some(Progress::downloading(percent))
    }

    /// Final 100% if the size was known and it was not reported yet.
    pub(crate) fn finish(&mut self) -> Option<Progress> {
        if !self.size_known || self.last_percent == Some(100) {
            return None;
        }
        self.last_percent = Some(100);
        Some(Progress::downloading(100))
    }
}

fn percent_of(downloaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let ratio = u128::from(downloaded.min(total)) * 100 / u128::from(total);
    u8::try_from(ratio).unwrap_or(100)
}

/// A release asset downloaded to a temporary file.
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct DownloadedAsset {
    tag: String,
    name: String,
    path: TempPath,
}

impl DownloadedAsset {
    /// Release tag the asset belongs to.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Asset file name as published.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Fetches the latest release of a component.
#[derive(Debug, Clone, Builder)]
pub struct ReleaseFetcher {
    /// Overrides the default `User-Agent`.
    #[builder(setters(name = with_user_agent))]
    user_agent: Option<String>,
    /// Sent as `Authorization: Bearer <token>`.
    #[builder(setters(name = with_token))]
    token: Option<String>,
    /// Where downloads are staged (system temp dir if unset).
    #[builder(setters(name = with_temp_dir))]
    temp_dir: Option<PathBuf>,
}

impl Default for ReleaseFetcher {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ReleaseFetcher {
    fn downloader(&self, url: &str, cancel: &CancellationToken) -> Downloader {
        let mut downloader = Downloader::new().url(url).cancel_token(cancel.clone());
        if let Some(agent) = &self.user_agent {
            downloader = downloader.user_agent(agent.as_str());
        }
        if let Some(token) = &self.token {
            downloader = downloader.bearer_token(token);
        }
        downloader
    }

    fn staging_file(&self, asset_name: &str) -> InstallerResult<TempPath> {
        let suffix = Path::new(asset_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let dir = self.temp_dir.clone().unwrap_or_else(std::env::temp_dir);

        let file = tempfile::Builder::new()
            .prefix("geode-")
            .suffix(&suffix)
            .tempfile_in(&dir)
            .map_err(|source| NetworkError::Io { path: dir, source })?;
        Ok(file.into_temp_path())
    }

    /// Retrieves and parses the release metadata at `feed_url`.
    ///
    /// # Errors
    ///
    /// Any [`NetworkError`] from the request, or [`NetworkError::Parse`] if
    /// the body is not a release object.
    pub async fn latest_release(
        &self,
        feed_url: &str,
        cancel: &CancellationToken,
    ) -> InstallerResult<Release> {
        let body = self
            .downloader(feed_url, cancel)
            .header("Accept", "application/vnd.github+json")
            .download_string()
            .await?;

        serde_json::from_str(&body).map_err(|e| {
            NetworkError::Parse {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Resolves the latest release at `feed_url` and downloads the asset
    /// chosen by `selector` to a temporary file.
    ///
    /// # Errors
    ///
    /// Request creation, status, transport, parse, no-matching-asset and
    /// cancellation errors, all as [`NetworkError`].
    pub async fn fetch_latest<F>(
        &self,
        feed_url: &str,
        selector: &AssetSelector,
        mut progress: F,
        cancel: &CancellationToken,
    ) -> InstallerResult<DownloadedAsset>
    where
        F: FnMut(Progress),
    {
        let release = self.latest_release(feed_url, cancel).await?;
        progress(Progress::version(&release.tag_name));

        let asset = selector.select(&release)?;
        info!(
            tag = %release.tag_name,
            asset = %asset.name,
            "downloading release asset"
        );

        let staging = self.staging_file(&asset.name)?;
        progress(Progress::waiting());

        let mut tracker = DownloadProgress::default();
        let bytes = self
            .downloader(&asset.browser_download_url, cancel)
            .file(staging.to_path_buf())
            .download_with_callback(|downloaded, total| {
                if let Some(update) = tracker.update(downloaded, total) {
                    progress(update);
                }
            })
            .await?;
        if let Some(update) = tracker.finish() {
            progress(update);
        }
        debug!(bytes, path = %staging.display(), "release asset staged");

        let name = asset.name.clone();
        Ok(DownloadedAsset {
            tag: release.tag_name,
            name,
            path: staging,
        })
    }

    /// Runs [`fetch_latest`](Self::fetch_latest) on the tokio runtime and
    /// returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn_latest(&self, feed_url: impl Into<String>, selector: AssetSelector) -> FetchHandle {
        let (sender, events) = flume::unbounded();
        let cancel = CancellationToken::new();

        let fetcher = self.clone();
        let feed_url = feed_url.into();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let progress_sender = sender.clone();
            let result = fetcher
                .fetch_latest(
                    &feed_url,
                    &selector,
                    |update| {
                        // Receiver gone means nobody is listening anymore.
                        let _ = progress_sender.send(FetchEvent::Progress(update));
                    },
                    &token,
                )
                .await;

            let terminal = match result {
                Ok(asset) => FetchEvent::Completed(asset),
                Err(err) => FetchEvent::Failed(err),
            };
            let _ = sender.send(terminal);
        });

        FetchHandle {
            events,
            cancel,
            task,
        }
    }
}

/// Event reported by a spawned fetch. Exactly one `Failed` or `Completed`
/// ends the stream.
#[derive(Debug)]
pub enum FetchEvent {
    Progress(Progress),
    Failed(InstallerError),
    Completed(DownloadedAsset),
}

/// Handle to a fetch running in the background.
#[derive(Debug)]
pub struct FetchHandle {
    events: flume::Receiver<FetchEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl FetchHandle {
    /// Raw event stream.
    #[must_use]
    pub const fn events(&self) -> &flume::Receiver<FetchEvent> {
        &self.events
    }

    /// Requests cancellation; the fetch ends with `Failed(Cancelled)`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drains events until the terminal one, forwarding progress.
    ///
    /// # Errors
    ///
    /// The fetch's own error, or [`InstallerError::Other`] if the task ended
    /// without reporting.
    pub async fn wait<F>(self, mut on_progress: F) -> InstallerResult<DownloadedAsset>
    where
        F: FnMut(Progress),
    {
        while let Ok(event) = self.events.recv_async().await {
            match event {
                FetchEvent::Progress(update) => on_progress(update),
                FetchEvent::Failed(err) => return Err(err),
                FetchEvent::Completed(asset) => return Ok(asset),
            }
        }

        match self.task.await {
            Err(e) => Err(InstallerError::other(format!("fetch task failed: {e}"))),
            Ok(()) => Err(InstallerError::other("fetch task ended without a result")),
        }
    }
}
