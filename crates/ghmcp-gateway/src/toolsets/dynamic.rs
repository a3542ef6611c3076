//! Dynamic toolset discovery
//!
//! With dynamic toolsets on, the server starts with few tools and exposes two
//! meta tools that let the model discover and enable the rest at runtime.

use rmcp::model::{CallToolResult, JsonObject, Tool};
use serde::Serialize;
use serde_json::json;

use super::params::{json_result, required_str};
use super::{schema, ToolCallError, ToolsetGroup};

pub const LIST_AVAILABLE_TOOLSETS: &str = "list_available_toolsets";
pub const ENABLE_TOOLSET: &str = "enable_toolset";

pub fn is_meta_tool(name: &str) -> bool {
    name == LIST_AVAILABLE_TOOLSETS || name == ENABLE_TOOLSET
}

pub fn meta_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            LIST_AVAILABLE_TOOLSETS,
            "List the toolsets this server offers and whether each one is enabled",
            schema(json!({ "type": "object", "properties": {} })),
        ),
        Tool::new(
            ENABLE_TOOLSET,
            "Enable one of the available toolsets; its tools are added to the tool list",
            schema(json!({
                "type": "object",
                "properties": {
                    "toolset": { "type": "string", "description": "Name of the toolset to enable" }
                },
                "required": ["toolset"]
            })),
        ),
    ]
}

#[derive(Serialize)]
struct ToolsetSummary<'a> {
    name: &'a str,
    description: &'a str,
    enabled: bool,
}

pub fn list_available_toolsets(group: &ToolsetGroup) -> Result<CallToolResult, ToolCallError> {
    let summaries: Vec<ToolsetSummary<'_>> = group
        .toolsets()
        .map(|t| ToolsetSummary {
            name: t.name,
            description: t.description,
            enabled: t.is_enabled(),
        })
        .collect();
    json_result(&summaries)
}

/// Outcome of an `enable_toolset` call
pub struct EnableOutcome {
    pub result: CallToolResult,
    /// The tool list changed and clients should be notified
    pub changed: bool,
}

pub fn enable_toolset(
    group: &mut ToolsetGroup,
    args: &JsonObject,
) -> Result<EnableOutcome, ToolCallError> {
    let name = required_str(args, "toolset")?;
    let changed = group
        .enable_toolset(&name)
        .map_err(|e| ToolCallError::InvalidParams(e.to_string()))?;

    let message = if changed {
        format!("Toolset {} enabled", name)
    } else {
        format!("Toolset {} is already enabled", name)
    };
    Ok(EnableOutcome {
        result: CallToolResult::success(vec![rmcp::model::Content::text(message)]),
        changed,
    })
}
