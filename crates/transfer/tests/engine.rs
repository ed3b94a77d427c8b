//! Integration tests for the transfer engine against a local HTTP server.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use bytes::Bytes;
use futures::StreamExt;
use tempfile::TempDir;
use transfer_engine::{
    TransferConfig, TransferEngine, TransferError, TransferOutcome, TransferRequest,
};

const FILE_LEN: usize = 64 * 1024 + 17;

fn payload() -> Vec<u8> {
    (0..FILE_LEN).map(|i| (i % 251) as u8).collect()
}

async fn stalled() -> Response {
    let head = futures::stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from(vec![7u8; 100]))]);
    let body = Body::from_stream(head.chain(futures::stream::pending()));
    Response::builder()
        .header(header::CONTENT_LENGTH, 1000)
        .body(body)
        .unwrap()
}

async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/file", get(|| async { payload() }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/stall", get(stalled));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn engine() -> TransferEngine {
    TransferEngine::new(TransferConfig::default().with_system_proxy(false)).unwrap()
}

async fn wait_for_bytes(handle: &transfer_engine::TransferHandle, bytes: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while handle.bytes_transferred() < bytes {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("transfer made no progress");
}

#[tokio::test]
async fn downloads_file_to_destination() {
    let addr = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("track.m4a");

    let request = TransferRequest::new(&dest, &format!("http://{addr}/file")).unwrap();
    let staging = request.staging_path();
    let handle = engine().start(request).await;

    assert_eq!(handle.expected_size(), Some(FILE_LEN as u64));
    handle.done().await;

    assert!(matches!(handle.outcome(), Some(TransferOutcome::Completed)));
    assert!(handle.error().is_none());
    assert_eq!(handle.bytes_transferred(), FILE_LEN as u64);
    assert_eq!(handle.progress(), 1.0);
    assert_eq!(std::fs::read(&dest).unwrap(), payload());
    assert!(!staging.exists());
}

#[tokio::test]
async fn creates_missing_parent_directories() {
    let addr = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("album").join("disc 1").join("track.m4a");

    let request = TransferRequest::new(&dest, &format!("http://{addr}/file")).unwrap();
    let handle = engine().start(request).await;
    handle.done().await;

    assert!(handle.error().is_none());
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), FILE_LEN as u64);
}

#[tokio::test]
async fn http_error_completes_handle_with_status() {
    let addr = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("missing.m4a");

    let request = TransferRequest::new(&dest, &format!("http://{addr}/missing")).unwrap();
    let handle = engine().start(request).await;

    assert!(handle.is_done());
    let err = handle.error().unwrap();
    match &*err {
        TransferError::HttpStatus { status, .. } => assert_eq!(*status, 404),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dest.exists());
}

#[tokio::test]
async fn connection_failure_completes_handle_with_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let request =
        TransferRequest::new(dir.path().join("a.m4a"), &format!("http://{addr}/file")).unwrap();
    let handle = engine().start(request).await;

    assert!(handle.is_done());
    assert!(matches!(
        handle.error().as_deref(),
        Some(TransferError::Network { .. })
    ));
}

#[tokio::test]
async fn cancel_stops_transfer_and_removes_staging_file() {
    let addr = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("stalled.m4a");

    let request = TransferRequest::new(&dest, &format!("http://{addr}/stall")).unwrap();
    let staging = request.staging_path();
    let handle = engine().start(request).await;

    assert_eq!(handle.expected_size(), Some(1000));
    wait_for_bytes(&handle, 100).await;
    assert!(!handle.is_done());

    handle.cancel().await.unwrap();

    assert!(handle.is_done());
    assert!(matches!(handle.outcome(), Some(TransferOutcome::Cancelled)));
    assert!(!dest.exists());
    assert!(!staging.exists());
}

#[tokio::test]
async fn cancel_leaves_existing_destination_untouched() {
    let addr = spawn_server().await;
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("existing.m4a");
    std::fs::write(&dest, b"already here").unwrap();

    let request = TransferRequest::new(&dest, &format!("http://{addr}/stall")).unwrap();
    let handle = engine().start(request).await;
    wait_for_bytes(&handle, 100).await;
    handle.cancel().await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"already here");
}
