//! Command line interface
//!
//! Every flag has a `GITHUB_*` environment fallback.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use ghmcp_core::domain::config::{parse_duration, DEFAULT_CONTENT_WINDOW_SIZE};
use ghmcp_core::HttpServerConfig;

pub const STDIO_REMOVED: &str =
    "stdio transport has been removed; run `github-mcp-http http` behind your OAuth proxy";

#[derive(Debug, Parser)]
#[command(
    name = "github-mcp-http",
    version,
    about = "Remote GitHub MCP server over Streamable HTTP"
)]
pub struct Cli {
    /// Comma-separated toolsets to enable ("all" enables everything)
    #[arg(
        long,
        env = "GITHUB_TOOLSETS",
        value_delimiter = ',',
        default_value = "all",
        global = true
    )]
    pub toolsets: Vec<String>,

    /// Start with no toolsets and let the model enable them on demand
    #[arg(long, env = "GITHUB_DYNAMIC_TOOLSETS", global = true)]
    pub dynamic_toolsets: bool,

    /// Only register tools that do not modify GitHub data
    #[arg(long, env = "GITHUB_READ_ONLY", global = true)]
    pub read_only: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "GITHUB_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// GitHub host, e.g. https://ghes.example.com (default: github.com)
    #[arg(long = "gh-host", env = "GITHUB_HOST", default_value = "", global = true)]
    pub gh_host: String,

    /// Maximum number of lines returned for file contents
    #[arg(
        long,
        env = "GITHUB_CONTENT_WINDOW_SIZE",
        default_value_t = DEFAULT_CONTENT_WINDOW_SIZE,
        global = true
    )]
    pub content_window_size: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve MCP over Streamable HTTP
    Http(HttpArgs),

    #[command(hide = true)]
    Stdio,
}

#[derive(Debug, Args)]
pub struct HttpArgs {
    /// Listen address, e.g. :8080 or 127.0.0.1:3000
    #[arg(long, env = "GITHUB_LISTEN", default_value = ":8080")]
    pub listen: String,

    /// Path of the MCP endpoint
    #[arg(long = "http-path", env = "GITHUB_HTTP_PATH", default_value = "/mcp")]
    pub http_path: String,

    /// Path of the health endpoint
    #[arg(long = "health-path", env = "GITHUB_HEALTH_PATH", default_value = "/health")]
    pub health_path: String,

    /// Maximum time to wait for open connections on shutdown (e.g. 10s, 500ms, 1m30s)
    #[arg(
        long = "shutdown-timeout",
        env = "GITHUB_SHUTDOWN_TIMEOUT",
        default_value = "10s",
        value_parser = parse_timeout
    )]
    pub shutdown_timeout: Duration,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Server configuration for the `http` subcommand
    pub fn http_config(&self, args: &HttpArgs) -> HttpServerConfig {
        HttpServerConfig {
            version: env!("CARGO_PKG_VERSION").to_string(),
            host: self.gh_host.clone(),
            enabled_toolsets: self.toolsets.clone(),
            dynamic_toolsets: self.dynamic_toolsets,
            read_only: self.read_only,
            content_window_size: self.content_window_size,
            listen_address: args.listen.clone(),
            endpoint_path: args.http_path.clone(),
            health_path: args.health_path.clone(),
            shutdown_timeout: args.shutdown_timeout,
            log_file_path: self.log_file.clone(),
        }
    }
}
