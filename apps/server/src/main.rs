//! github-mcp-http - remote GitHub MCP server
//!
//! Runs behind an OAuth proxy that forwards the user's GitHub token as
//! `Authorization: Bearer <token>`.

mod cli;
mod logging;

use anyhow::Context;
use clap::Parser;
use ghmcp_gateway::GatewayServer;
use tracing::info;

use cli::{Cli, Command, STDIO_REMOVED};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env values act as environment fallbacks for the CLI
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let args = match &cli.command {
        Command::Http(args) => args,
        Command::Stdio => anyhow::bail!(STDIO_REMOVED),
    };

    // Held until main returns so buffered log lines are flushed on every exit path
    let _log_guard = logging::init_tracing(cli.log_file.as_deref())?;

    let config = cli.http_config(args);
    let server = GatewayServer::new(config).context("failed to configure server")?;
    server.run().await.context("server stopped with an error")?;

    info!("[Gateway] Stopped");
    Ok(())
}
