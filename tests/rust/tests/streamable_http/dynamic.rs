//! Dynamic toolset discovery
//!
//! Validates that:
//! 1. Only the discovery tools are listed at start
//! 2. enable_toolset makes a toolset's tools callable
//! 3. Connected clients get tools/list_changed over SSE

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rmcp::model::{CallToolRequestParams, ClientInfo};
use rmcp::service::NotificationContext;
use serde_json::{json, Value};
use tests::async_helpers::{with_timeout, DEFAULT_TIMEOUT};
use tests::client::{client_info, connect, connect_with};
use tests::fixtures::config_for;
use tests::server::TestServer;
use tokio::sync::Notify;
use wiremock::MockServer;

use super::first_text;

fn call(name: &str, arguments: Value) -> CallToolRequestParams {
    CallToolRequestParams {
        name: name.to_string().into(),
        arguments: arguments.as_object().cloned(),
        task: None,
        meta: None,
    }
}

async fn dynamic_server(upstream: &MockServer) -> TestServer {
    let mut config = config_for(upstream);
    config.dynamic_toolsets = true;
    TestServer::start(config).await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_starts_with_discovery_tools_only() {
    let upstream = MockServer::start().await;
    let server = dynamic_server(&upstream).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let tools = client.list_tools(Default::default()).await.unwrap();
    let names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(names, vec!["list_available_toolsets", "enable_toolset"]);

    let info = client.peer_info().expect("server info after initialize");
    let tools_capability = info.capabilities.tools.as_ref().expect("tools capability");
    assert_eq!(tools_capability.list_changed, Some(true));

    let listed = client
        .call_tool(call("list_available_toolsets", json!({})))
        .await
        .unwrap();
    let text = first_text(&listed);
    assert!(text.contains("context"), "{text}");
    assert!(text.contains("repos"), "{text}");

    client.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_enable_toolset_exposes_its_tools() {
    let upstream = MockServer::start().await;
    let server = dynamic_server(&upstream).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let result = client
        .call_tool(call("enable_toolset", json!({ "toolset": "context" })))
        .await
        .unwrap();
    assert_ne!(result.is_error, Some(true));

    let tools = client.list_tools(Default::default()).await.unwrap();
    let names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
    assert!(names.contains(&"get_me".to_string()), "{names:?}");
    assert!(!names.contains(&"get_file_contents".to_string()), "{names:?}");

    client.cancel().await.ok();
    server.stop().await.ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_enable_unknown_toolset_is_a_tool_error() {
    let upstream = MockServer::start().await;
    let server = dynamic_server(&upstream).await;
    let client = connect(&server.mcp_url(), "xyz").await;

    let result = client
        .call_tool(call("enable_toolset", json!({ "toolset": "nope" })))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));

    client.cancel().await.ok();
    server.stop().await.ok();
}

/// Client that signals when tools/list_changed arrives
#[derive(Clone)]
struct ListChangedClient {
    notified: Arc<Notify>,
}

impl rmcp::ClientHandler for ListChangedClient {
    fn get_info(&self) -> ClientInfo {
        client_info()
    }

    fn on_tool_list_changed(
        &self,
        _context: NotificationContext<rmcp::RoleClient>,
    ) -> impl std::future::Future<Output = ()> + Send + '_ {
        self.notified.notify_one();
        async {}
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_enable_toolset_notifies_list_changed() {
    let upstream = MockServer::start().await;
    let server = dynamic_server(&upstream).await;

    let notified = Arc::new(Notify::new());
    let client = connect_with(
        &server.mcp_url(),
        "xyz",
        ListChangedClient {
            notified: notified.clone(),
        },
    )
    .await;

    // Let the SSE stream establish
    tokio::time::sleep(Duration::from_millis(200)).await;

    let result = client
        .call_tool(call("enable_toolset", json!({ "toolset": "repos" })))
        .await
        .unwrap();
    assert_ne!(result.is_error, Some(true));

    with_timeout(DEFAULT_TIMEOUT, notified.notified()).await;

    client.cancel().await.ok();
    server.stop().await.ok();
}
