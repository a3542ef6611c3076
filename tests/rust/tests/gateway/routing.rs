//! Health route and MCP endpoint routing

use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use tests::fixtures::config_for;
use tests::server::TestServer;
use wiremock::MockServer;

#[tokio::test]
async fn test_health_get_and_head() {
    let upstream = MockServer::start().await;
    let server = TestServer::start(config_for(&upstream)).await;
    let http = reqwest::Client::new();

    let response = http.get(server.health_url()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(response.text().await.unwrap(), "ok\n");

    let response = http.head(server.health_url()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_custom_paths_are_normalized() {
    let upstream = MockServer::start().await;
    let mut config = config_for(&upstream);
    config.endpoint_path = "api/mcp/".to_string();
    config.health_path = "healthz".to_string();
    let server = TestServer::start(config).await;
    let http = reqwest::Client::new();

    let response = http.get(server.url("/healthz")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = http.post(server.url("/api/mcp")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_mcp_without_token_gets_challenge() {
    let upstream = MockServer::start().await;
    let server = TestServer::start(config_for(&upstream)).await;
    let http = reqwest::Client::new();

    for auth in [None, Some("Basic dXNlcjpwYXNz"), Some("Bearer ")] {
        let mut request = http
            .post(server.mcp_url())
            .header("content-type", "application/json")
            .body(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#);
        if let Some(value) = auth {
            request = request.header("authorization", value);
        }
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{auth:?}");
        assert_eq!(
            response.headers()["www-authenticate"],
            "Bearer realm=\"github-mcp-server\""
        );
    }

    // Nothing reached GitHub
    assert!(upstream.received_requests().await.unwrap().is_empty());
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_trailing_slash_reaches_mcp_handler() {
    let upstream = MockServer::start().await;
    let server = TestServer::start(config_for(&upstream)).await;
    let http = reqwest::Client::new();

    let url = format!("{}/", server.mcp_url());
    let response = http
        .get(url)
        .header("authorization", "Bearer abc")
        .send()
        .await
        .unwrap();

    // The MCP service answers (it rejects a GET without a session), not the router
    assert_ne!(response.status(), StatusCode::NOT_FOUND);
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let upstream = MockServer::start().await;
    let server = TestServer::start(config_for(&upstream)).await;

    let response = reqwest::get(server.url("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.stop().await.unwrap();
}
