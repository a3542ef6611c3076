//! GitHub MCP Gateway
//!
//! Remote MCP server for GitHub over Streamable HTTP:
//! - Bearer token extraction per request (validation is left to GitHub)
//! - Per-request REST, GraphQL and raw-content clients
//! - Toolsets with read-only and dynamic discovery modes
//! - Server lifecycle with bounded graceful shutdown

pub mod clients;
pub mod logging;
pub mod mcp;
pub mod server;
pub mod toolsets;

pub use clients::{ClientError, ClientFactory, ContentOptions, GraphQlClient, RawClient, RestClient};
pub use mcp::GitHubMcpHandler;
pub use server::{shutdown_signal, GatewayServer, LifecycleState, ServerError};
pub use toolsets::{build_toolset_group, known_toolsets, ToolsetError, ToolsetGroup};
