//! Request shape, credentials and error mapping

use ghmcp_core::ExecutionContext;
use ghmcp_gateway::{ClientError, ContentOptions};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{ctx, factory};

#[tokio::test]
async fn test_rest_request_carries_token_and_api_headers() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .and(header("authorization", "Bearer abc"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octocat" })))
        .expect(1)
        .mount(&upstream)
        .await;

    let rest = factory(&upstream).rest_client(&ctx("abc")).unwrap();
    let user: Value = rest.get_json("user").await.unwrap();
    assert_eq!(user["login"], "octocat");
}

#[tokio::test]
async fn test_same_token_on_every_client() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octocat" })))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "viewer": { "login": "octocat" } } })),
        )
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/octo/hello/HEAD/README.md"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# hello\n"))
        .expect(1)
        .mount(&upstream)
        .await;

    let clients = factory(&upstream);
    let ctx = ctx("tok");

    let _: Value = clients.rest_client(&ctx).unwrap().get_json("user").await.unwrap();
    let data: Value = clients
        .graphql_client(&ctx)
        .unwrap()
        .query("query { viewer { login } }", json!({}))
        .await
        .unwrap();
    assert_eq!(data["viewer"]["login"], "octocat");

    let body = clients
        .raw_client(&ctx)
        .unwrap()
        .get_raw_content("octo", "hello", "README.md", &ContentOptions::default())
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "# hello\n");
}

#[tokio::test]
async fn test_raw_content_uses_sha_over_ref() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw/octo/hello/abc123/src/lib.rs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pub fn f() {}"))
        .expect(1)
        .mount(&upstream)
        .await;

    let opts = ContentOptions {
        git_ref: Some("refs/heads/main".to_string()),
        sha: Some("abc123".to_string()),
    };
    let response = factory(&upstream)
        .raw_client(&ctx("t"))
        .unwrap()
        .get_raw_content("octo", "hello", "src/lib.rs", &opts)
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_graphql_sends_variables_and_joins_errors() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/graphql"))
        .and(body_partial_json(json!({ "variables": { "owner": "octo" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "first" }, { "message": "second" }]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let result: Result<Value, _> = factory(&upstream)
        .graphql_client(&ctx("t"))
        .unwrap()
        .query("query($owner: String!) { x }", json!({ "owner": "octo" }))
        .await;

    match result {
        Err(ClientError::GraphQl(message)) => assert_eq!(message, "first; second"),
        other => panic!("expected GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_error_keeps_status_and_message() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/repos/octo/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&upstream)
        .await;

    let result: Result<Value, _> = factory(&upstream)
        .rest_client(&ctx("t"))
        .unwrap()
        .get_json("repos/octo/missing")
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "GitHub API error (404): Not Found");
}

#[tokio::test]
async fn test_missing_token_never_reaches_github() {
    let upstream = MockServer::start().await;
    let clients = factory(&upstream);
    let empty = ExecutionContext::new();

    assert!(matches!(
        clients.rest_client(&empty),
        Err(ClientError::Unauthenticated(_))
    ));
    assert!(matches!(
        clients.graphql_client(&empty),
        Err(ClientError::Unauthenticated(_))
    ));
    assert!(matches!(
        clients.raw_client(&empty),
        Err(ClientError::Unauthenticated(_))
    ));
    assert!(upstream.received_requests().await.unwrap().is_empty());
}
