//! HTTP request logging middleware
//!
//! One entry line and one exit line per request, correlated by trace id.
//! Response bodies are never buffered: MCP responses may be long-lived SSE
//! streams.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn, Instrument};

use crate::logging::{RequestSpan, TraceContext};
use crate::mcp::parse_bearer;

/// Upper bound for buffering a JSON-RPC request body
const MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// Headers that are logged at DEBUG level
const LOGGED_HEADERS: &[&str] = &[
    "content-type",
    "accept",
    "user-agent",
    "mcp-session-id",
    "mcp-protocol-version",
];

/// Headers whose value is replaced before logging
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "x-api-key"];

/// Compact `name=value` rendering with secrets redacted
pub fn redact_headers_compact(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| {
            let name = name.as_str();
            LOGGED_HEADERS.contains(&name) || SENSITIVE_HEADERS.contains(&name)
        })
        .map(|(name, value)| {
            if SENSITIVE_HEADERS.contains(&name.as_str()) {
                format!("{}=[REDACTED]", name)
            } else {
                format!("{}={:?}", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the JSON-RPC method from a request body (first message of a batch)
pub fn extract_mcp_method(bytes: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    let message = match &json {
        serde_json::Value::Array(batch) => batch.first()?,
        other => other,
    };
    message
        .get("method")
        .and_then(|m| m.as_str())
        .map(String::from)
}

/// Logging middleware for every route
pub async fn http_logging_middleware(request: Request, next: Next) -> Response {
    let ctx = TraceContext::new(request.method().as_str(), request.uri().path());
    let span = RequestSpan::enter(&ctx);

    async move {
        debug!(
            trace_id = %ctx.trace_id,
            headers = %redact_headers_compact(request.headers()),
            "Request headers"
        );

        // Requests the auth layer will reject are passed through unread
        let authenticated = parse_bearer(
            request
                .headers()
                .get(header::AUTHORIZATION)
                .map(|v| v.as_bytes()),
        )
        .is_ok();

        let (ctx, mut request) = if request.method() == Method::POST && authenticated {
            let (parts, body) = request.into_parts();
            let bytes = match to_bytes(body, MAX_BODY_SIZE).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(trace_id = %ctx.trace_id, "Failed to read request body: {}", e);
                    RequestSpan::log_exit(&ctx, StatusCode::PAYLOAD_TOO_LARGE.as_u16());
                    return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
                        .into_response();
                }
            };
            let ctx = ctx.with_mcp_method(extract_mcp_method(&bytes));
            (ctx, Request::from_parts(parts, Body::from(bytes)))
        } else {
            (ctx, request)
        };

        RequestSpan::log_entry(&ctx);
        request.extensions_mut().insert(ctx.clone());

        let response = next.run(request).await;
        RequestSpan::log_exit(&ctx, response.status().as_u16());
        response
    }
    .instrument(span)
    .await
}
