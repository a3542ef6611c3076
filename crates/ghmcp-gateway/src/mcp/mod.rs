//! MCP Server Implementation
//!
//! - `handler`: ServerHandler over the enabled toolsets
//! - `context`: per-call execution context built from the HTTP request
//! - `auth_middleware`: bearer token extraction in front of the MCP service

pub mod auth_middleware;
pub mod context;
pub mod handler;

pub use auth_middleware::{bearer_auth_middleware, parse_bearer};
pub use handler::GitHubMcpHandler;
