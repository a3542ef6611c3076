//! Tool argument helpers and tool-level errors

use ghmcp_core::ExecutionContext;
use rmcp::model::{CallToolResult, Content, JsonObject};
use thiserror::Error;

use crate::clients::ClientError;
use crate::mcp::context::UpstreamErrors;

/// Failure of a single tool call, reported to the MCP client as a tool error
#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("{0}")]
    InvalidParams(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ToolCallError {
    /// Render as a tool error result, recording upstream failures in the
    /// call's error scope.
    pub fn into_tool_result(self, ctx: &ExecutionContext) -> CallToolResult {
        if let Self::Client(err) = &self {
            if let Some(errors) = ctx.get::<UpstreamErrors>() {
                errors.record(err.to_string(), err.status());
            }
        }
        CallToolResult::error(vec![Content::text(self.to_string())])
    }
}

pub(crate) fn required_str(args: &JsonObject, name: &str) -> Result<String, ToolCallError> {
    match args.get(name) {
        None | Some(serde_json::Value::Null) => Err(ToolCallError::InvalidParams(format!(
            "missing required parameter: {}",
            name
        ))),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(serde_json::Value::String(_)) => Err(ToolCallError::InvalidParams(format!(
            "parameter {} must not be empty",
            name
        ))),
        Some(_) => Err(ToolCallError::InvalidParams(format!(
            "parameter {} must be a string",
            name
        ))),
    }
}

pub(crate) fn optional_str(args: &JsonObject, name: &str) -> Result<Option<String>, ToolCallError> {
    match args.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(ToolCallError::InvalidParams(format!(
            "parameter {} must be a string",
            name
        ))),
    }
}

/// An owner or repository name: one path segment
pub(crate) fn repo_segment(args: &JsonObject, name: &str) -> Result<String, ToolCallError> {
    let value = required_str(args, name)?;
    if value.contains('/') || value == "." || value == ".." {
        return Err(ToolCallError::InvalidParams(format!(
            "parameter {} is not a valid name: {}",
            name, value
        )));
    }
    Ok(value)
}

/// Serialize `value` as the single text content of a successful result
pub(crate) fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, ToolCallError> {
    let text = serde_json::to_string(value)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
