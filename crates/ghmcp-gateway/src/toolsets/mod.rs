//! Toolsets - named groups of GitHub tools
//!
//! A [`ToolsetGroup`] owns every known toolset and tracks which are enabled.
//! Write tools are left out entirely in read-only mode.

mod context;
pub mod dynamic;
mod params;
mod repos;

pub use params::ToolCallError;

use std::sync::Arc;

use futures::future::BoxFuture;
use ghmcp_core::ExecutionContext;
use rmcp::model::{CallToolResult, JsonObject, Tool};
use thiserror::Error;

use crate::clients::ClientFactory;

/// Toolset name that enables everything
pub const ALL_TOOLSETS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolsetError {
    #[error("toolset {0} does not exist")]
    Unknown(String),
}

/// Shared state handed to every tool invocation
pub struct ToolDeps {
    pub clients: Arc<ClientFactory>,
    /// Maximum number of lines returned for file contents
    pub content_window_size: usize,
}

pub type ToolResult = Result<CallToolResult, ToolCallError>;

pub type ToolHandler =
    Arc<dyn Fn(Arc<ToolDeps>, ExecutionContext, JsonObject) -> BoxFuture<'static, ToolResult> + Send + Sync>;

/// A tool definition plus the function that serves it
#[derive(Clone)]
pub struct ServerTool {
    pub tool: Tool,
    pub handler: ToolHandler,
}

impl ServerTool {
    pub fn new<F, Fut>(tool: Tool, handler: F) -> Self
    where
        F: Fn(Arc<ToolDeps>, ExecutionContext, JsonObject) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ToolResult> + Send + 'static,
    {
        Self {
            tool,
            handler: Arc::new(move |deps, ctx, args| Box::pin(handler(deps, ctx, args))),
        }
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }
}

pub struct Toolset {
    pub name: &'static str,
    pub description: &'static str,
    /// Extra guidance appended to the server instructions when enabled
    pub instructions: Option<&'static str>,
    enabled: bool,
    read_tools: Vec<ServerTool>,
    write_tools: Vec<ServerTool>,
}

impl Toolset {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            instructions: None,
            enabled: false,
            read_tools: Vec::new(),
            write_tools: Vec::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: &'static str) -> Self {
        self.instructions = Some(instructions);
        self
    }

    pub fn add_read_tools(mut self, tools: impl IntoIterator<Item = ServerTool>) -> Self {
        self.read_tools.extend(tools);
        self
    }

    pub fn add_write_tools(mut self, tools: impl IntoIterator<Item = ServerTool>) -> Self {
        self.write_tools.extend(tools);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Tools served by this toolset, honoring read-only mode
    fn active_tools(&self, read_only: bool) -> impl Iterator<Item = &ServerTool> {
        let writes: &[ServerTool] = if read_only { &[] } else { &self.write_tools };
        self.read_tools.iter().chain(writes.iter())
    }
}

pub struct ToolsetGroup {
    toolsets: Vec<Toolset>,
    read_only: bool,
}

impl ToolsetGroup {
    pub fn new(read_only: bool) -> Self {
        Self {
            toolsets: Vec::new(),
            read_only,
        }
    }

    pub fn add_toolset(&mut self, toolset: Toolset) {
        self.toolsets.push(toolset);
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn toolsets(&self) -> impl Iterator<Item = &Toolset> {
        self.toolsets.iter()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.toolsets
            .iter()
            .any(|t| t.name == name && t.enabled)
    }

    /// Enable the named toolsets; `all` enables every toolset.
    ///
    /// Fails on the first unknown name, leaving earlier names enabled.
    pub fn enable_toolsets<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), ToolsetError> {
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name == ALL_TOOLSETS {
                self.toolsets.iter_mut().for_each(|t| t.enabled = true);
                continue;
            }
            self.enable_toolset(name)?;
        }
        Ok(())
    }

    /// Enable one toolset. Returns `true` when it was not enabled before.
    pub fn enable_toolset(&mut self, name: &str) -> Result<bool, ToolsetError> {
        let toolset = self
            .toolsets
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| ToolsetError::Unknown(name.to_string()))?;
        let changed = !toolset.enabled;
        toolset.enabled = true;
        Ok(changed)
    }

    /// Tool definitions of every enabled toolset
    pub fn available_tools(&self) -> Vec<Tool> {
        self.toolsets
            .iter()
            .filter(|t| t.enabled)
            .flat_map(|t| t.active_tools(self.read_only))
            .map(|t| t.tool.clone())
            .collect()
    }

    /// Look up a tool among the enabled toolsets
    pub fn find_tool(&self, name: &str) -> Option<ServerTool> {
        self.toolsets
            .iter()
            .filter(|t| t.enabled)
            .flat_map(|t| t.active_tools(self.read_only))
            .find(|t| t.name() == name)
            .cloned()
    }

    /// Server instructions for the enabled toolsets
    pub fn instructions(&self, dynamic: bool) -> String {
        let mut out = String::from(
            "The GitHub MCP Server provides tools to interact with GitHub platforms. \
             Tool calls are made on behalf of the user whose token authorized the request.",
        );

        let enabled: Vec<&Toolset> = self.toolsets.iter().filter(|t| t.enabled).collect();
        if !enabled.is_empty() {
            let names: Vec<&str> = enabled.iter().map(|t| t.name).collect();
            out.push_str(&format!("\n\nEnabled toolsets: {}.", names.join(", ")));
        }
        for toolset in &enabled {
            if let Some(extra) = toolset.instructions {
                out.push_str("\n\n");
                out.push_str(extra);
            }
        }
        if self.read_only {
            out.push_str("\n\nThe server is in read-only mode; tools that modify data are unavailable.");
        }
        if dynamic {
            out.push_str(
                "\n\nMore tools are available on demand: call list_available_toolsets to see \
                 them and enable_toolset to turn a toolset on.",
            );
        }
        out
    }
}

/// Toolset names accepted on the command line
pub fn known_toolsets() -> Vec<&'static str> {
    default_toolset_group(false).toolsets().map(|t| t.name).collect()
}

/// Every built-in toolset, none enabled yet
pub fn default_toolset_group(read_only: bool) -> ToolsetGroup {
    let mut group = ToolsetGroup::new(read_only);
    group.add_toolset(context::toolset());
    group.add_toolset(repos::toolset());
    group
}

/// Build the toolset group for a server start.
///
/// In dynamic mode `all` is dropped from the startup list: toolsets are then
/// enabled one by one through `enable_toolset`.
pub fn build_toolset_group<S: AsRef<str>>(
    enabled: &[S],
    read_only: bool,
    dynamic: bool,
) -> Result<ToolsetGroup, ToolsetError> {
    let names: Vec<&str> = enabled
        .iter()
        .map(|s| s.as_ref())
        .filter(|name| !(dynamic && name.trim() == ALL_TOOLSETS))
        .collect();

    let mut group = default_toolset_group(read_only);
    group.enable_toolsets(&names)?;
    Ok(group)
}

/// Wrap a JSON schema literal for [`Tool::new`]
pub(crate) fn schema(value: serde_json::Value) -> Arc<JsonObject> {
    match value {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}
