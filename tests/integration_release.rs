// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for release resolution and asset download.
//!
//! A wiremock server plays the role of the GitHub releases API.

use std::time::Duration;

use geode_installer::error::{InstallerError, NetworkError};
use geode_installer::platform::LoaderLayout;
use geode_installer::release::{AssetSelector, FetchEvent, Progress, ReleaseFetcher};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY_LEN: usize = 4096;

/// Serves a release feed at `/latest` whose assets point back at the server.
async fn mount_feed(server: &MockServer, assets: &[&str]) {
    let assets: Vec<_> = assets
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "browser_download_url": format!("{}/download/{name}", server.uri()),
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": "v4.1.0",
            "assets": assets,
        })))
        .mount(server)
        .await;
}

async fn mount_asset(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; BODY_LEN]))
        .mount(server)
        .await;
}

fn fetcher_in(dir: &std::path::Path) -> ReleaseFetcher {
    ReleaseFetcher::builder()
        .with_temp_dir(dir.to_path_buf())
        .build()
}

// =============================================================================
// fetch_latest
// =============================================================================

#[tokio::test]
async fn fetch_latest_downloads_platform_asset() {
    let server = MockServer::start().await;
    mount_feed(&server, &["geode-v4.1.0-mac.zip", "geode-v4.1.0-win.zip"]).await;
    mount_asset(&server, "geode-v4.1.0-win.zip").await;
    let tmp = tempfile::tempdir().unwrap();

    let mut events = Vec::new();
    let asset = fetcher_in(tmp.path())
        .fetch_latest(
            &format!("{}/latest", server.uri()),
            &AssetSelector::Platform(LoaderLayout::WINDOWS),
            |p| events.push(p),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(asset.tag(), "v4.1.0");
    assert_eq!(asset.name(), "geode-v4.1.0-win.zip");
    assert_eq!(std::fs::read(asset.path()).unwrap().len(), BODY_LEN);
    assert!(asset.path().starts_with(tmp.path()));
    assert_eq!(
        asset.path().extension().and_then(|e| e.to_str()),
        Some("zip")
    );

    assert_eq!(events[0], Progress::version("v4.1.0"));
    assert_eq!(events[1], Progress::waiting());
    assert_eq!(events.last(), Some(&Progress::downloading(100)));

    let percents: Vec<u8> = events[2..]
        .iter()
        .inspect(|p| assert_eq!(p.label, "Downloading"))
        .map(|p| p.percent)
        .collect();
    assert!(percents.windows(2).all(|w| w[0] < w[1]), "{percents:?}");
}

#[tokio::test]
async fn fetch_latest_selects_api_by_extension() {
    let server = MockServer::start().await;
    mount_feed(&server, &["api-src.zip", "geode.api.geode"]).await;
    mount_asset(&server, "geode.api.geode").await;
    let tmp = tempfile::tempdir().unwrap();

    let asset = fetcher_in(tmp.path())
        .fetch_latest(
            &format!("{}/latest", server.uri()),
            &AssetSelector::API,
            |_| {},
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(asset.name(), "geode.api.geode");
    assert_eq!(
        asset.path().extension().and_then(|e| e.to_str()),
        Some("geode")
    );
}

#[tokio::test]
async fn fetch_latest_reports_missing_asset() {
    let server = MockServer::start().await;
    mount_feed(&server, &["geode-v4.1.0-win.zip"]).await;

    let mut events = Vec::new();
    let err = ReleaseFetcher::default()
        .fetch_latest(
            &format!("{}/latest", server.uri()),
            &AssetSelector::Platform(LoaderLayout::MACOS),
            |p| events.push(p),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    let InstallerError::Network(inner) = &err else {
        panic!("expected network error, got {err:?}");
    };
    assert!(matches!(**inner, NetworkError::NoMatchingAsset { .. }));
    assert!(err.to_string().ends_with("No release asset for MacOS found"));
    // Version is announced before selection.
    assert_eq!(events, vec![Progress::version("v4.1.0")]);
}

#[tokio::test]
async fn fetch_latest_rejects_malformed_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let err = ReleaseFetcher::default()
        .latest_release(&format!("{}/latest", server.uri()), &CancellationToken::new())
        .await
        .unwrap_err();

    let InstallerError::Network(inner) = &err else {
        panic!("expected network error, got {err:?}");
    };
    assert!(matches!(**inner, NetworkError::Parse { .. }));
}

#[tokio::test]
async fn fetch_latest_maps_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = ReleaseFetcher::default()
        .latest_release(&format!("{}/latest", server.uri()), &CancellationToken::new())
        .await
        .unwrap_err();

    let InstallerError::Network(inner) = &err else {
        panic!("expected network error, got {err:?}");
    };
    assert!(matches!(**inner, NetworkError::Unauthorized { .. }));
}

#[tokio::test]
async fn fetch_latest_sends_token_and_accept_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": "v4.1.0",
            "assets": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let release = ReleaseFetcher::builder()
        .with_token("ghp_test".to_string())
        .build()
        .latest_release(&format!("{}/latest", server.uri()), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(release.tag_name, "v4.1.0");
    assert!(release.assets.is_empty());
}

/// Serves one chunked response (no Content-Length) on a loopback port and
/// returns its base URL.
fn serve_chunked_once(chunks: &'static [&'static [u8]]) -> String {
    use std::io::{BufRead, BufReader, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
            line.clear();
        }

        let mut stream = stream;
        stream
            .write_all(
                b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            )
            .unwrap();
        for chunk in chunks {
            write!(stream, "{:x}\r\n", chunk.len()).unwrap();
            stream.write_all(chunk).unwrap();
            stream.write_all(b"\r\n").unwrap();
        }
        stream.write_all(b"0\r\n\r\n").unwrap();
        stream.flush().unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn fetch_latest_without_content_length_announces_once() {
    static CHUNKS: &[&[u8]] = &[&[1u8; 1024], &[2u8; 1024], &[3u8; 512]];
    let download = serve_chunked_once(CHUNKS);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": "v4.1.0",
            "assets": [{
                "name": "geode-v4.1.0-win.zip",
                "browser_download_url": format!("{download}/geode-v4.1.0-win.zip"),
            }],
        })))
        .mount(&server)
        .await;
    let tmp = tempfile::tempdir().unwrap();

    let mut events = Vec::new();
    let asset = fetcher_in(tmp.path())
        .fetch_latest(
            &format!("{}/latest", server.uri()),
            &AssetSelector::Platform(LoaderLayout::WINDOWS),
            |p| events.push(p),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(std::fs::read(asset.path()).unwrap().len(), 2560);
    assert_eq!(
        events,
        vec![
            Progress::version("v4.1.0"),
            Progress::waiting(),
            Progress::beginning(),
        ]
    );
}

#[tokio::test]
async fn downloaded_asset_removed_on_drop() {
    let server = MockServer::start().await;
    mount_feed(&server, &["geode-v4.1.0-win.zip"]).await;
    mount_asset(&server, "geode-v4.1.0-win.zip").await;
    let tmp = tempfile::tempdir().unwrap();

    let asset = fetcher_in(tmp.path())
        .fetch_latest(
            &format!("{}/latest", server.uri()),
            &AssetSelector::Platform(LoaderLayout::WINDOWS),
            |_| {},
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    let staged = asset.path().to_path_buf();
    assert!(staged.exists());

    drop(asset);
    assert!(!staged.exists());
}

// =============================================================================
// spawn_latest
// =============================================================================

#[tokio::test]
async fn spawn_latest_streams_events() {
    let server = MockServer::start().await;
    mount_feed(&server, &["geode-v4.1.0-win.zip"]).await;
    mount_asset(&server, "geode-v4.1.0-win.zip").await;
    let tmp = tempfile::tempdir().unwrap();

    let handle = fetcher_in(tmp.path()).spawn_latest(
        format!("{}/latest", server.uri()),
        AssetSelector::Platform(LoaderLayout::WINDOWS),
    );

    let mut events = Vec::new();
    let asset = handle.wait(|p| events.push(p)).await.unwrap();

    assert_eq!(asset.tag(), "v4.1.0");
    assert_eq!(events.first(), Some(&Progress::version("v4.1.0")));
    assert_eq!(events.last(), Some(&Progress::downloading(100)));
}

#[tokio::test]
async fn spawn_latest_reports_failure_as_terminal_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let handle = ReleaseFetcher::default().spawn_latest(
        format!("{}/latest", server.uri()),
        AssetSelector::API,
    );

    let event = handle.events().recv_async().await.unwrap();
    let FetchEvent::Failed(err) = event else {
        panic!("expected failure, got {event:?}");
    };
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn spawn_latest_cancel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let handle = ReleaseFetcher::default().spawn_latest(
        format!("{}/latest", server.uri()),
        AssetSelector::API,
    );
    handle.cancel();

    let err = tokio::time::timeout(Duration::from_secs(5), handle.wait(|_| {}))
        .await
        .expect("cancelled fetch should finish promptly")
        .unwrap_err();
    assert!(err.is_cancelled());
}
