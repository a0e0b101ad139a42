// geode-installer: Geode mod loader installer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the network module using wiremock.
//!
//! Covers string and file downloads, status mapping (200 / 401 / other),
//! progress callbacks, cancellation and custom headers.

use std::sync::{Arc, Mutex};

use geode_installer::error::{InstallerError, NetworkError};
use geode_installer::net::{DEFAULT_USER_AGENT, Downloader};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn network_error(err: InstallerError) -> NetworkError {
    match err {
        InstallerError::Network(boxed) => *boxed,
        other => panic!("Expected InstallerError::Network, got {other:?}"),
    }
}

// =============================================================================
// download_string tests
// =============================================================================

#[tokio::test]
async fn test_download_string_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"tag_name":"v1"}"#))
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed.json", mock_server.uri());
    let body = Downloader::new().url(&url).download_string().await.unwrap();
    assert_eq!(body, r#"{"tag_name":"v1"}"#);
}

#[tokio::test]
async fn test_download_string_http_errors() {
    for status in [204, 404, 500] {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.json"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&mock_server)
            .await;

        let url = format!("{}/feed.json", mock_server.uri());
        let err = Downloader::new().url(&url).download_string().await.unwrap_err();
        match network_error(err) {
            NetworkError::HttpStatus {
                status: actual,
                url: reported,
            } => {
                assert_eq!(actual, status);
                assert_eq!(reported, url);
            }
            other => panic!("Expected NetworkError::HttpStatus for {status}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_download_string_unauthorized() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let url = format!("{}/private.json", mock_server.uri());
    let err = Downloader::new().url(&url).download_string().await.unwrap_err();
    assert!(matches!(network_error(err), NetworkError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_download_string_without_url() {
    let err = Downloader::new().download_string().await.unwrap_err();
    assert!(matches!(
        network_error(err),
        NetworkError::RequestCreation { .. }
    ));
}

#[tokio::test]
async fn test_download_string_invalid_url() {
    let err = Downloader::new()
        .url("not a url")
        .download_string()
        .await
        .unwrap_err();
    match network_error(err) {
        NetworkError::RequestCreation { url, .. } => assert_eq!(url, "not a url"),
        other => panic!("Expected NetworkError::RequestCreation, got {other:?}"),
    }
}

// =============================================================================
// File download tests
// =============================================================================

#[tokio::test]
async fn test_download_file_creates_parent_dirs() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geode.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK-payload".to_vec()))
        .mount(&mock_server)
        .await;

    let temp_dir = temp_dir();
    let output_file = temp_dir.path().join("nested").join("geode.zip");

    let url = format!("{}/geode.zip", mock_server.uri());
    let written = Downloader::new()
        .url(&url)
        .file(&output_file)
        .download_with_callback(|_, _| {})
        .await
        .unwrap();

    assert_eq!(written, 10);
    assert_eq!(std::fs::read(&output_file).unwrap(), b"PK-payload");
}

#[tokio::test]
async fn test_download_file_404_leaves_no_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let temp_dir = temp_dir();
    let output_file = temp_dir.path().join("missing.zip");

    let url = format!("{}/missing.zip", mock_server.uri());
    let err = Downloader::new()
        .url(&url)
        .file(&output_file)
        .download_with_callback(|_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(
        network_error(err),
        NetworkError::HttpStatus { status: 404, .. }
    ));
    assert!(!output_file.exists());
}

#[tokio::test]
async fn test_download_file_without_output() {
    let err = Downloader::new()
        .url("http://127.0.0.1:1/never")
        .download_with_callback(|_, _| {})
        .await
        .unwrap_err();
    assert!(matches!(
        network_error(err),
        NetworkError::RequestCreation { .. }
    ));
}

// =============================================================================
// Progress callback tests
// =============================================================================

#[tokio::test]
async fn test_progress_reports_known_total() {
    let mock_server = MockServer::start().await;
    let body = vec![b'x'; 64 * 1024];
    Mock::given(method("GET"))
        .and(path("/sized.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&mock_server)
        .await;

    let temp_dir = temp_dir();
    let output_file = temp_dir.path().join("sized.zip");
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&calls);

    let url = format!("{}/sized.zip", mock_server.uri());
    Downloader::new()
        .url(&url)
        .file(&output_file)
        .download_with_callback(move |done, total| recorder.lock().unwrap().push((done, total)))
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.first(), Some(&(0, Some(body.len() as u64))));
    assert_eq!(calls.last(), Some(&(body.len() as u64, Some(body.len() as u64))));
    assert!(calls.windows(2).all(|pair| pair[0].0 <= pair[1].0));
}

#[tokio::test]
async fn test_progress_first_call_precedes_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty.zip"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let temp_dir = temp_dir();
    let output_file = temp_dir.path().join("empty.zip");
    let mut calls = Vec::new();

    let url = format!("{}/empty.zip", mock_server.uri());
    let written = Downloader::new()
        .url(&url)
        .file(&output_file)
        .download_with_callback(|done, total| calls.push((done, total)))
        .await
        .unwrap();

    assert_eq!(written, 0);
    assert_eq!(calls, vec![(0, Some(0))]);
    assert!(output_file.exists());
}

// =============================================================================
// Cancellation tests
// =============================================================================

#[tokio::test]
async fn test_download_cancelled_cleans_partial_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1024 * 1024]))
        .mount(&mock_server)
        .await;

    let temp_dir = temp_dir();
    let output_file = temp_dir.path().join("large.zip");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let url = format!("{}/large.zip", mock_server.uri());
    let err = Downloader::new()
        .url(&url)
        .file(&output_file)
        .cancel_token(cancel)
        .download_with_callback(|_, _| {})
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!output_file.exists(), "Partial file should be cleaned up");
}

#[tokio::test]
async fn test_download_cancelled_mid_stream() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 8 * 1024 * 1024]))
        .mount(&mock_server)
        .await;

    let temp_dir = temp_dir();
    let output_file = temp_dir.path().join("large.zip");

    let url = format!("{}/large.zip", mock_server.uri());
    let downloader = Downloader::new().url(&url).file(&output_file);
    let cancel = downloader.cancel_handle();
    let err = downloader
        .download_with_callback(|done, _| {
            if done > 0 {
                cancel.cancel();
            }
        })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!output_file.exists());
}

#[tokio::test]
async fn test_download_string_cancelled() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/feed.json", mock_server.uri());
    let downloader = Downloader::new().url(&url);
    downloader.cancel_handle().cancel();

    let err = downloader.download_string().await.unwrap_err();
    assert!(matches!(network_error(err), NetworkError::Cancelled));
}

// =============================================================================
// Header tests
// =============================================================================

#[tokio::test]
async fn test_custom_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth.json"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("X-Custom", "custom-value"))
        .respond_with(ResponseTemplate::new(200).set_body_string("authenticated"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/auth.json", mock_server.uri());
    let body = Downloader::new()
        .url(&url)
        .bearer_token("test-token")
        .header("X-Custom", "custom-value")
        .download_string()
        .await
        .unwrap();
    assert_eq!(body, "authenticated");
}

#[tokio::test]
async fn test_default_and_overridden_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/default"))
        .and(header("User-Agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("default"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/custom"))
        .and(header("User-Agent", "my-installer/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("custom"))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let default = Downloader::new()
        .url(format!("{base}/default"))
        .download_string()
        .await
        .unwrap();
    let custom = Downloader::new()
        .url(format!("{base}/custom"))
        .user_agent("my-installer/2.0")
        .download_string()
        .await
        .unwrap();

    assert_eq!(default, "default");
    assert_eq!(custom, "custom");
}
