//! GitHub MCP Handler
//!
//! Implements the MCP ServerHandler trait on top of the enabled toolsets.

use std::sync::Arc;

use ghmcp_core::{branding, ExecutionContext};
use parking_lot::RwLock;
use rmcp::{
    model::*, service::RequestContext, ErrorData as McpError, RoleServer, ServerHandler,
};
use tracing::{debug, info, warn};

use super::context::{call_context, extract_session_id};
use crate::clients::ClientFactory;
use crate::toolsets::{dynamic, ToolDeps, ToolsetGroup};

/// Shared by every MCP session served by one server
#[derive(Clone)]
pub struct GitHubMcpHandler {
    deps: Arc<ToolDeps>,
    toolsets: Arc<RwLock<ToolsetGroup>>,
    version: Arc<str>,
    dynamic: bool,
}

impl GitHubMcpHandler {
    pub fn new(
        clients: Arc<ClientFactory>,
        toolsets: ToolsetGroup,
        version: &str,
        dynamic: bool,
        content_window_size: usize,
    ) -> Self {
        Self {
            deps: Arc::new(ToolDeps {
                clients,
                content_window_size,
            }),
            toolsets: Arc::new(RwLock::new(toolsets)),
            version: Arc::from(version),
            dynamic,
        }
    }

    pub fn clients(&self) -> &Arc<ClientFactory> {
        &self.deps.clients
    }

    async fn call_meta_tool(
        &self,
        name: &str,
        args: &JsonObject,
        context: &RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = ExecutionContext::new();

        if name == dynamic::LIST_AVAILABLE_TOOLSETS {
            let result = dynamic::list_available_toolsets(&self.toolsets.read());
            return Ok(result.unwrap_or_else(|e| e.into_tool_result(&ctx)));
        }

        let outcome = dynamic::enable_toolset(&mut self.toolsets.write(), args);
        match outcome {
            Ok(outcome) => {
                if outcome.changed {
                    info!(toolset = ?args.get("toolset"), "Toolset enabled at runtime");
                    if let Err(e) = context.peer.notify_tool_list_changed().await {
                        warn!("Failed to send tools/list_changed: {}", e);
                    }
                }
                Ok(outcome.result)
            }
            Err(e) => Ok(e.into_tool_result(&ctx)),
        }
    }
}

impl ServerHandler for GitHubMcpHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools_with(ToolsCapability {
                    list_changed: Some(self.dynamic),
                })
                .build(),
            server_info: Implementation {
                name: branding::SERVER_NAME.to_string(),
                version: self.version.to_string(),
                ..Default::default()
            },
            instructions: Some(self.toolsets.read().instructions(self.dynamic)),
        }
    }

    async fn initialize(
        &self,
        params: InitializeRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        let client = &params.client_info;
        let agent = branding::client_user_agent(&self.version, &client.name, &client.version);
        self.deps.clients.set_identification(&agent);

        info!(
            client = %client.name,
            client_version = %client.version,
            session = ?extract_session_id(&context.extensions),
            "Client initializing"
        );

        if context.peer.peer_info().is_none() {
            context.peer.set_peer_info(params);
        }
        Ok(self.get_info())
    }

    async fn list_tools(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let mut tools = self.toolsets.read().available_tools();
        if self.dynamic {
            tools.extend(dynamic::meta_tools());
        }

        let tool_names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
        debug!(count = tools.len(), tools = ?tool_names, "list_tools");

        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = params.name.to_string();
        let args = params.arguments.unwrap_or_default();

        if self.dynamic && dynamic::is_meta_tool(&name) {
            return self.call_meta_tool(&name, &args, &context).await;
        }

        let tool = self
            .toolsets
            .read()
            .find_tool(&name)
            .ok_or_else(|| McpError::invalid_params(format!("unknown tool: {}", name), None))?;

        info!(tool = %name, "call_tool");

        let (ctx, errors) = call_context(&context.extensions);
        let result = match (tool.handler)(self.deps.clone(), ctx.clone(), args).await {
            Ok(result) => result,
            Err(e) => e.into_tool_result(&ctx),
        };

        if !errors.is_empty() {
            warn!(tool = %name, errors = ?errors.snapshot(), "Upstream errors during tool call");
        }
        debug!(tool = %name, is_error = ?result.is_error, "call_tool result");

        Ok(result)
    }
}
