//! Per-call execution context for MCP requests

use std::sync::Arc;

use ghmcp_core::ExecutionContext;
use parking_lot::Mutex;
use rmcp::model::Extensions;

/// One failed upstream call made while serving a tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub message: String,
    pub status: Option<u16>,
}

/// Collects upstream failures for the duration of one tool call
#[derive(Debug, Clone, Default)]
pub struct UpstreamErrors(Arc<Mutex<Vec<UpstreamError>>>);

impl UpstreamErrors {
    pub fn record(&self, message: impl Into<String>, status: Option<u16>) {
        self.0.lock().push(UpstreamError {
            message: message.into(),
            status,
        });
    }

    pub fn snapshot(&self) -> Vec<UpstreamError> {
        self.0.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// Build the execution context from the HTTP request rmcp received.
///
/// The inbound request's extensions (which carry the bearer token attached by
/// the auth middleware) become the context; a request that did not arrive over
/// HTTP yields an empty context.
pub fn execution_context(extensions: &Extensions) -> ExecutionContext {
    extensions
        .get::<http::request::Parts>()
        .map(|parts| ExecutionContext::from_extensions(parts.extensions.clone()))
        .unwrap_or_default()
}

/// [`execution_context`] plus a fresh [`UpstreamErrors`] scope
pub fn call_context(extensions: &Extensions) -> (ExecutionContext, UpstreamErrors) {
    let errors = UpstreamErrors::default();
    let ctx = execution_context(extensions).with(errors.clone());
    (ctx, errors)
}

/// Extract the MCP session id from the request headers
pub fn extract_session_id(extensions: &Extensions) -> Option<String> {
    extensions
        .get::<http::request::Parts>()
        .and_then(|parts| parts.headers.get("mcp-session-id"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
