//! Domain types and pure functions
//!
//! - Host resolution (`HostEndpoints`, `resolve_host`)
//! - Credential context (`ExecutionContext`, `BearerToken`, `TokenResolver`)
//! - Server configuration (`HttpServerConfig`) and its normalization rules

pub mod config;
mod credential;
mod host;

pub use config::{ConfigError, HttpServerConfig};
pub use credential::*;
pub use host::*;
