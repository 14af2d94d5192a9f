//! End-to-end fetch over real HTTP against a loopback responder

use std::sync::Arc;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use echojr::brain::{BrainConfig, ContextCache, FetchOutcome};
use echojr::github::{FetchError, HttpTransport};
use echojr::storage::Storage;

/// Serves one request with a fixed response and returns the request head
async fn serve_once(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request).to_string()
    });

    (base, handle)
}

fn create_brain(api_base: String) -> (ContextCache, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = BrainConfig {
        api_base,
        ..BrainConfig::default()
    };
    let brain = ContextCache::new(
        config,
        Arc::new(HttpTransport::new()),
        Some(Storage::with_dir(temp_dir.path().to_path_buf())),
    );
    (brain, temp_dir)
}

#[tokio::test]
async fn test_fetch_over_http_caches_decoded_content() {
    let (base, server) = serve_once("200 OK", r#"{"type":"file","content":"aGVs\nbG8=\n"}"#).await;
    let (brain, _temp_dir) = create_brain(base);
    brain.set_context("A", "B");

    let outcome = brain.on_file_selected("p/q.txt").await.unwrap();
    let request = server.await.unwrap();

    assert!(outcome.is_cached());
    assert_eq!(brain.read_cached_file().as_deref(), Some("hello"));
    assert!(
        request.starts_with("GET /repos/A/B/contents/p%2Fq.txt HTTP/1.1"),
        "unexpected request: {}",
        request
    );
    let lower = request.to_lowercase();
    assert!(lower.contains("user-agent: echojr/"));
    assert!(!lower.contains("authorization:"));
}

#[tokio::test]
async fn test_fetch_over_http_error_status() {
    let (base, server) = serve_once("404 Not Found", r#"{"message":"Not Found"}"#).await;
    let (brain, _temp_dir) = create_brain(base);
    brain.set_context("A", "B");

    let outcome = brain.on_file_selected("missing.txt").await.unwrap();
    server.await.unwrap();

    assert!(matches!(
        outcome,
        FetchOutcome::Failed(FetchError::FetchFailed { status: 404 })
    ));
    assert!(brain.read_cached_file().is_none());
}

#[tokio::test]
async fn test_fetch_over_http_non_json_body() {
    let (base, server) = serve_once("200 OK", "<html>rate limited</html>").await;
    let (brain, _temp_dir) = create_brain(base);
    brain.set_context("A", "B");

    let outcome = brain.on_file_selected("a.txt").await.unwrap();
    server.await.unwrap();

    assert!(matches!(outcome, FetchOutcome::Failed(FetchError::ParseFailed(_))));
    assert!(brain.read_cached_file().is_none());
}
