// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP downloads with cancellation.
//!
//! ```text
//! Downloader::new()
//!   .url() .file() .header()
//!   .user_agent() .bearer_token()
//!   .cancel_token()
//!        |
//!        +-------------------+
//!        v                   v
//!   download_with_       download_
//!   callback(cb)         string()
//!        |
//!        v
//!   cb(downloaded, Some(total) | None)
//!
//! Global client: OnceLock, connection pool, keep-alive
//! Status:        200 -> ok, 401 -> Unauthorized, else -> HttpStatus
//! Cancellation:  CancellationToken -> cleanup partial -> Cancelled
//! ```

use std::path::PathBuf;
use std::sync::OnceLock;

use futures_util::StreamExt;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{InstallerResult, NetworkError};

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("geode-installer/", env!("CARGO_PKG_VERSION"));

/// RAII guard that removes a partial download file on Drop unless explicitly kept.
///
/// Covers error paths and cancellation alike. Deletion is blocking; it only
/// runs when a download did not complete.
struct PartialFileGuard {
    path: PathBuf,
    keep: bool,
}

impl PartialFileGuard {
    const fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    const fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Global HTTP client - initialized once, reused across all downloads.
/// Falls back to a basic client if custom configuration fails.
fn global_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// Maps a response status onto the installer's error model.
fn check_status(url: &str, status: StatusCode) -> InstallerResult<()> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED => Err(NetworkError::Unauthorized {
            url: url.to_string(),
        }
        .into()),
        other => Err(NetworkError::HttpStatus {
            status: other.as_u16(),
            url: url.to_string(),
        }
        .into()),
    }
}

/// Async HTTP downloader with builder pattern.
///
/// # Example
/// ```ignore
/// use geode_installer::net::Downloader;
///
/// let cancel = CancellationToken::new();
/// Downloader::new()
///     .url("https://example.com/geode.zip")
///     .file("/tmp/geode.zip")
///     .cancel_token(cancel.clone())
///     .download_with_callback(|done, total| println!("{done}/{total:?}"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    url: Option<String>,
    output_file: Option<PathBuf>,
    headers: Vec<(String, String)>,
    cancel: CancellationToken,
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader {
    /// Create a new downloader using the shared client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: global_client().clone(),
            url: None,
            output_file: None,
            headers: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the URL to download from.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the output file path.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Add a custom header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the client's default `User-Agent`.
    #[must_use]
    pub fn user_agent(self, agent: impl Into<String>) -> Self {
        self.header(USER_AGENT.as_str(), agent)
    }

    /// Send `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer_token(self, token: &str) -> Self {
        self.header(AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    /// Use `token` to cancel this download from elsewhere.
    #[must_use]
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this download when triggered.
    #[must_use]
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn send(&self) -> InstallerResult<(&str, Response)> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| NetworkError::RequestCreation {
                url: String::new(),
                message: "no URL provided".to_string(),
            })?;

        let mut request = self.client.get(url);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request
            .build()
            .map_err(|e| NetworkError::RequestCreation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        debug!(url, "sending request");
        let response = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(NetworkError::Cancelled.into()),
            response = self.client.execute(request) => {
                response.map_err(|source| NetworkError::RequestFailed {
                    url: url.to_string(),
                    source,
                })?
            }
        };

        check_status(url, response.status())?;
        Ok((url, response))
    }

    /// Download to the configured file, reporting progress through `progress`.
    ///
    /// The callback receives (`bytes_downloaded`, `total_bytes`). It is called
    /// once with zero bytes before the body is read, then after every chunk.
    /// `total_bytes` is `None` without a Content-Length header. Returns the
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No URL or output file is configured.
    /// - The network request fails or returns a status other than 200.
    /// - The output file cannot be created or written to.
    /// - The cancellation token fires.
    ///
    /// A partially written file is removed on every error path.
    pub async fn download_with_callback<F>(&self, mut progress: F) -> InstallerResult<u64>
    where
        F: FnMut(u64, Option<u64>),
    {
        let output = self
            .output_file
            .clone()
            .ok_or_else(|| NetworkError::RequestCreation {
                url: self.url.clone().unwrap_or_default(),
                message: "no output file specified".to_string(),
            })?;

        let (url, response) = self.send().await?;
        let total_size = response.content_length();

        let io_error = |source| NetworkError::Io {
            path: output.clone(),
            source,
        };

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let mut file = tokio::fs::File::create(&output).await.map_err(io_error)?;

        let mut guard = PartialFileGuard::new(output.clone());
        let mut downloaded: u64 = 0;
        progress(downloaded, total_size);

        let mut stream = response.bytes_stream();
        loop {
            let chunk = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    debug!(url, downloaded, "download cancelled");
                    return Err(NetworkError::Cancelled.into());
                }
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = chunk else { break };

            let chunk = chunk.map_err(|source| NetworkError::RequestFailed {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk).await.map_err(io_error)?;
            downloaded += chunk.len() as u64;
            trace!(downloaded, total = ?total_size, "chunk received");

            progress(downloaded, total_size);
        }

        file.flush().await.map_err(io_error)?;
        guard.keep();

        debug!(url, bytes = downloaded, path = %output.display(), "download complete");
        Ok(downloaded)
    }

    /// Download and return content as string.
    ///
    /// # Errors
    ///
    /// Returns an error if the network request fails, returns a status other
    /// than 200, or the cancellation token fires.
    pub async fn download_string(&self) -> InstallerResult<String> {
        let (url, response) = self.send().await?;

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(NetworkError::Cancelled.into()),
            text = response.text() => text.map_err(|source| {
                NetworkError::RequestFailed {
                    url: url.to_string(),
                    source,
                }
                .into()
            }),
        }
    }
}
