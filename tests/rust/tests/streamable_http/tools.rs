//! Tool listing and tool calls through the gateway

use pretty_assertions::assert_eq;
use rmcp::model::CallToolRequestParams;
use serde_json::{json, Value};
use tests::client::connect;
use tests::fixtures::config_for;
use tests::server::TestServer;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::first_text;

fn call(name: &str, arguments: Value) -> CallToolRequestParams {
    CallToolRequestParams {
        name: name.to_string().into(),
        arguments: arguments.as_object().cloned(),
        task: None,
        meta: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_info_and_tools() {
    let upstream = MockServer::start().await;
    let server = TestServer::start(config_for(&upstream)).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let info = client.peer_info().expect("server info after initialize");
    assert_eq!(info.server_info.name, "github-mcp-server");
    assert_eq!(info.server_info.version, "0.0.0-test");

    let tools = client.list_tools(Default::default()).await.unwrap();
    let names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "get_me",
            "get_file_contents",
            "get_repository_summary",
            "star_repository",
        ]
    );

    client.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_me_uses_caller_token_and_client_identity() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .and(header("authorization", "Bearer xyz"))
        .and(header(
            "user-agent",
            "github-mcp-http/0.0.0-test (test-client/1.0.0)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": "octocat",
            "id": 1,
            "html_url": "https://github.com/octocat",
            "public_repos": 8
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = TestServer::start(config_for(&upstream)).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let result = client.call_tool(call("get_me", json!({}))).await.unwrap();
    assert_ne!(result.is_error, Some(true));

    let user: Value = serde_json::from_str(&first_text(&result)).unwrap();
    assert_eq!(user["login"], "octocat");
    assert_eq!(user["profile_url"], "https://github.com/octocat");

    client.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_each_session_forwards_its_own_token() {
    let upstream = MockServer::start().await;
    for (token, login) in [("alice-token", "alice"), ("bob-token", "bob")] {
        Mock::given(method("GET"))
            .and(path("/api/v3/user"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "login": login, "id": 1 })),
            )
            .expect(1)
            .mount(&upstream)
            .await;
    }

    let server = TestServer::start(config_for(&upstream)).await;
    let alice = connect(&server.mcp_url(), "alice-token").await;
    let bob = connect(&server.mcp_url(), "bob-token").await;

    let from_bob = bob.call_tool(call("get_me", json!({}))).await.unwrap();
    let from_alice = alice.call_tool(call("get_me", json!({}))).await.unwrap();
    assert!(first_text(&from_alice).contains("\"alice\""));
    assert!(first_text(&from_bob).contains("\"bob\""));

    alice.cancel().await.ok();
    bob.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upstream_failure_is_a_tool_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
        )
        .mount(&upstream)
        .await;

    let server = TestServer::start(config_for(&upstream)).await;
    let client = connect(&server.mcp_url(), "expired").await;

    let result = client.call_tool(call("get_me", json!({}))).await.unwrap();
    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        first_text(&result),
        "GitHub API error (401): Bad credentials"
    );

    client.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_file_contents_truncates_to_window() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw/octo/hello/main/notes.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("one\ntwo\nthree\n"))
        .expect(1)
        .mount(&upstream)
        .await;

    let mut config = config_for(&upstream);
    config.content_window_size = 2;
    let server = TestServer::start(config).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let result = client
        .call_tool(call(
            "get_file_contents",
            json!({ "owner": "octo", "repo": "hello", "path": "notes.txt", "ref": "main" }),
        ))
        .await
        .unwrap();

    assert_eq!(first_text(&result), "one\ntwo\n");
    let all = serde_json::to_string(&result.content).unwrap();
    assert!(all.contains("[output truncated to the first 2 lines]"));

    client.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_arguments_do_not_reach_github() {
    let upstream = MockServer::start().await;
    let server = TestServer::start(config_for(&upstream)).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let result = client
        .call_tool(call("get_repository_summary", json!({ "owner": "octo" })))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert_eq!(first_text(&result), "missing required parameter: repo");
    assert!(upstream.received_requests().await.unwrap().is_empty());

    client.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_tool_is_a_protocol_error() {
    let upstream = MockServer::start().await;
    let server = TestServer::start(config_for(&upstream)).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let result = client.call_tool(call("delete_everything", json!({}))).await;
    assert!(result.is_err());

    client.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_read_only_hides_write_tools() {
    let upstream = MockServer::start().await;
    let mut config = config_for(&upstream);
    config.read_only = true;
    let server = TestServer::start(config).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let tools = client.list_tools(Default::default()).await.unwrap();
    let names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
    assert!(names.contains(&"get_me".to_string()));
    assert!(!names.contains(&"star_repository".to_string()));

    let result = client
        .call_tool(call(
            "star_repository",
            json!({ "owner": "octo", "repo": "hello" }),
        ))
        .await;
    assert!(result.is_err());
    assert!(upstream.received_requests().await.unwrap().is_empty());

    client.cancel().await.ok();
    server.stop().await.ok();
}
