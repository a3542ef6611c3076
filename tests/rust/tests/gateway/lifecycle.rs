//! Server start and shutdown

use std::time::Duration;

use ghmcp_gateway::{GatewayServer, ServerError};
use tests::async_helpers::{with_timeout, DEFAULT_TIMEOUT};
use tests::fixtures::config_for;
use tests::server::TestServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::MockServer;

#[tokio::test]
async fn test_shutdown_returns_ok() {
    let upstream = MockServer::start().await;
    let server = TestServer::start(config_for(&upstream)).await;

    let response = reqwest::get(server.health_url()).await.unwrap();
    assert!(response.status().is_success());

    let result = with_timeout(DEFAULT_TIMEOUT, server.stop()).await;
    assert!(result.is_ok(), "{result:?}");
}

#[tokio::test]
async fn test_shutdown_timeout_closes_stalled_connections() {
    let upstream = MockServer::start().await;
    let mut config = config_for(&upstream);
    config.shutdown_timeout = Duration::from_millis(300);
    let server = TestServer::start(config).await;

    // Headers complete, body cut short: the request stays in flight
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(
            b"POST /mcp HTTP/1.1\r\n\
              Host: localhost\r\n\
              Authorization: Bearer t\r\n\
              Content-Type: application/json\r\n\
              Content-Length: 1000\r\n\
              \r\n\
              {\"jsonrpc\":",
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let result = with_timeout(DEFAULT_TIMEOUT, server.stop()).await;
    match result {
        Err(ServerError::ShutdownTimeout(timeout)) => {
            assert_eq!(timeout, Duration::from_millis(300))
        }
        other => panic!("expected shutdown timeout, got {other:?}"),
    }

    let mut buf = [0u8; 256];
    let read = tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf))
        .await
        .expect("stalled connection should be closed after the timeout");
    assert!(matches!(read, Ok(0) | Err(_)), "{read:?}");
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let upstream = MockServer::start().await;
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = occupied.local_addr().unwrap();

    let mut config = config_for(&upstream);
    config.listen_address = addr.to_string();
    let server = GatewayServer::new(config).unwrap();

    let result = with_timeout(
        DEFAULT_TIMEOUT,
        server.run_until(std::future::pending::<()>()),
    )
    .await;

    match result {
        Err(ServerError::Bind { address, .. }) => assert_eq!(address, addr.to_string()),
        other => panic!("expected bind error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_run_until_binds_configured_address() {
    let upstream = MockServer::start().await;
    // Reserve a free port, then release it for the server
    let addr = {
        let reserved = TcpListener::bind("127.0.0.1:0").await.unwrap();
        reserved.local_addr().unwrap()
    };

    let mut config = config_for(&upstream);
    config.listen_address = addr.to_string();
    config.shutdown_timeout = Duration::from_secs(2);
    let server = GatewayServer::new(config).unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async move {
        let _ = rx.await;
    }));

    let url = format!("http://{}/health", addr);
    let mut healthy = false;
    for _ in 0..50 {
        if let Ok(response) = reqwest::get(&url).await {
            healthy = response.status().is_success();
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(healthy, "server never became healthy on {addr}");

    tx.send(()).unwrap();
    let result = with_timeout(DEFAULT_TIMEOUT, handle).await.unwrap();
    assert!(result.is_ok(), "{result:?}");
}
