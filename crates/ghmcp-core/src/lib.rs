//! # GitHub MCP Core Library
//!
//! Transport-agnostic building blocks for the GitHub MCP HTTP gateway.
//!
//! ## Modules
//!
//! - `branding` - Product naming shared by the gateway and the binary
//! - `domain` - Host resolution, credential context and server configuration

pub mod branding;
pub mod domain;

// Re-export commonly used types
pub use domain::*;
