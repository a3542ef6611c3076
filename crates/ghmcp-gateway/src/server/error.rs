use std::io;
use std::time::Duration;

use ghmcp_core::{ConfigError, HostError};
use thiserror::Error;

use crate::toolsets::ToolsetError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid server configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid GitHub host: {0}")]
    Host(#[from] HostError),

    #[error("invalid toolset configuration: {0}")]
    Toolset(#[from] ToolsetError),

    #[error("failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] io::Error),

    #[error("graceful shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("HTTP server error during shutdown: {0}")]
    AfterShutdown(#[source] io::Error),

    #[error("HTTP server task ended without reporting a result")]
    ListenerLost,
}
