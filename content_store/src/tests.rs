//
// Copyright 2025 The Project Oak Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use std::time::{Duration, Instant};

use attestation_types::ContentId;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use super::*;

enum ServerMode {
    Respond { status_line: &'static str, content_length: Option<usize>, body: Vec<u8> },
    Stall,
}

/// Serves a single canned HTTP response on an ephemeral port and returns the
/// base URL to reach it.
async fn start_server(mode: ServerMode) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("binding test listener");
    let addr = listener.local_addr().expect("reading test listener address");
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request).await;
            match mode {
                ServerMode::Stall => tokio::time::sleep(Duration::from_secs(60)).await,
                ServerMode::Respond { status_line, content_length, body } => {
                    let mut head = format!("HTTP/1.1 {status_line}\r\nConnection: close\r\n");
                    if let Some(length) = content_length {
                        head.push_str(&format!("Content-Length: {length}\r\n"));
                    }
                    head.push_str("\r\n");
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(&body).await;
                    let _ = stream.shutdown().await;
                }
            }
        }
    });
    format!("http://{addr}")
}

fn blob_id() -> ContentId {
    ContentId::new("blob-1").expect("id should validate")
}

#[tokio::test]
async fn fetch_returns_body_bytes() {
    let body = b"Hello, accessible world!".to_vec();
    let base_url = start_server(ServerMode::Respond {
        status_line: "200 OK",
        content_length: Some(body.len()),
        body: body.clone(),
    })
    .await;
    let store = HttpBlobStore::new(base_url, FetchLimits::default());
    let fetched = store.fetch(&blob_id()).await.expect("fetch should succeed");
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn missing_blob_maps_to_not_found() {
    let base_url = start_server(ServerMode::Respond {
        status_line: "404 Not Found",
        content_length: Some(0),
        body: Vec::new(),
    })
    .await;
    let store = HttpBlobStore::new(base_url, FetchLimits::default());
    let err = store.fetch(&blob_id()).await.expect_err("fetch should fail");
    assert!(matches!(err, FetchError::NotFound), "unexpected error: {err}");
}

#[tokio::test]
async fn server_error_maps_to_transport() {
    let base_url = start_server(ServerMode::Respond {
        status_line: "500 Internal Server Error",
        content_length: Some(0),
        body: Vec::new(),
    })
    .await;
    let store = HttpBlobStore::new(base_url, FetchLimits::default());
    let err = store.fetch(&blob_id()).await.expect_err("fetch should fail");
    assert!(matches!(err, FetchError::Transport(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn advertised_length_over_limit_is_rejected_without_reading_body() {
    let base_url = start_server(ServerMode::Respond {
        status_line: "200 OK",
        content_length: Some(5000),
        body: Vec::new(),
    })
    .await;
    let limits = FetchLimits { max_bytes: 1024, ..FetchLimits::default() };
    let store = HttpBlobStore::new(base_url, limits);
    let err = store.fetch(&blob_id()).await.expect_err("fetch should fail");
    assert!(matches!(err, FetchError::TooLarge { limit: 1024 }), "unexpected error: {err}");
}

#[tokio::test]
async fn streamed_body_over_limit_is_rejected() {
    // No Content-Length: the body is delimited by connection close, so the
    // ceiling can only be enforced while streaming.
    let base_url = start_server(ServerMode::Respond {
        status_line: "200 OK",
        content_length: None,
        body: vec![b'x'; 4096],
    })
    .await;
    let limits = FetchLimits { max_bytes: 1024, ..FetchLimits::default() };
    let store = HttpBlobStore::new(base_url, limits);
    let err = store.fetch(&blob_id()).await.expect_err("fetch should fail");
    assert!(matches!(err, FetchError::TooLarge { limit: 1024 }), "unexpected error: {err}");
}

#[tokio::test]
async fn stalled_server_times_out_within_margin() {
    let base_url = start_server(ServerMode::Stall).await;
    let limits = FetchLimits { timeout: Duration::from_millis(250), ..FetchLimits::default() };
    let store = HttpBlobStore::new(base_url, limits);
    let started = Instant::now();
    let err = store.fetch(&blob_id()).await.expect_err("fetch should fail");
    assert!(matches!(err, FetchError::Timeout), "unexpected error: {err}");
    assert!(started.elapsed() < Duration::from_secs(2), "timeout took {:?}", started.elapsed());
}
