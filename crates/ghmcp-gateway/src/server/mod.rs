//! Gateway Server
//!
//! HTTP server exposing the GitHub MCP handler over Streamable HTTP, plus a
//! health route. Owns the accept loop, every connection task and graceful
//! shutdown.

mod error;
mod handlers;
mod lifecycle;
pub mod logging_middleware;

pub use error::ServerError;
pub use lifecycle::{shutdown_signal, LifecycleState};

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use ghmcp_core::{branding, resolve_host, ContextTokenResolver, HttpServerConfig};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::clients::ClientFactory;
use crate::mcp::{bearer_auth_middleware, GitHubMcpHandler};
use crate::toolsets::build_toolset_group;
use lifecycle::transition;

const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);
const SSE_RETRY: Duration = Duration::from_secs(3);

pub struct GatewayServer {
    config: HttpServerConfig,
    handler: GitHubMcpHandler,
}

impl GatewayServer {
    /// Validate the configuration, resolve the host and build the handler.
    ///
    /// Upstream credentials come from each request's bearer token.
    pub fn new(config: HttpServerConfig) -> Result<Self, ServerError> {
        let config = config.normalize()?;
        let endpoints = Arc::new(resolve_host(&config.host)?);
        info!(
            kind = ?endpoints.kind(),
            rest = %endpoints.rest_url(),
            "[Gateway] Resolved GitHub host"
        );
        let clients = Arc::new(ClientFactory::new(
            endpoints,
            Arc::new(ContextTokenResolver),
            &config.version,
        ));
        Self::with_clients(config, clients)
    }

    /// Build a server around an existing client factory
    pub fn with_clients(
        config: HttpServerConfig,
        clients: Arc<ClientFactory>,
    ) -> Result<Self, ServerError> {
        let config = config.normalize()?;
        let toolsets = build_toolset_group(
            &config.enabled_toolsets,
            config.read_only,
            config.dynamic_toolsets,
        )?;
        let handler = GitHubMcpHandler::new(
            clients,
            toolsets,
            &config.version,
            config.dynamic_toolsets,
            config.content_window_size,
        );
        transition(LifecycleState::Created);
        Ok(Self { config, handler })
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    pub fn handler(&self) -> &GitHubMcpHandler {
        &self.handler
    }

    /// Build the Axum router. Cancelling `shutdown` ends open MCP sessions.
    pub fn router(&self, shutdown: &CancellationToken) -> Router {
        let handler = self.handler.clone();
        let mcp_service = StreamableHttpService::new(
            move || {
                debug!("[Gateway] Creating handler instance for MCP session");
                Ok(handler.clone())
            },
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig {
                stateful_mode: true,
                sse_keep_alive: Some(SSE_KEEP_ALIVE),
                sse_retry: Some(SSE_RETRY),
                cancellation_token: shutdown.child_token(),
            },
        );

        let endpoint = self.config.endpoint_path.as_str();
        let mut mcp_routes = Router::new().route_service(endpoint, mcp_service.clone());
        if !endpoint.ends_with('/') {
            mcp_routes = mcp_routes.route_service(&format!("{}/", endpoint), mcp_service);
        }
        let mcp_routes = mcp_routes.layer(middleware::from_fn(bearer_auth_middleware));

        Router::new()
            .route(&self.config.health_path, get(handlers::health))
            .merge(mcp_routes)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(
                logging_middleware::http_logging_middleware,
            ))
    }

    /// Serve until SIGINT or SIGTERM
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown_signal()).await
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        self.launch(None, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        self.launch(Some(listener), shutdown).await
    }

    async fn launch<F>(self, listener: Option<TcpListener>, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let token = CancellationToken::new();
        let router = self.router(&token);
        let address = self.config.listen_address.clone();
        let timeout = self.config.shutdown_timeout;

        info!(
            "[Gateway] Starting {} {} on {} (mcp: {}, health: {})",
            branding::DISPLAY_NAME,
            self.config.version,
            address,
            self.config.endpoint_path,
            self.config.health_path
        );

        // Single slot: the listener reports exactly once and never blocks
        let (done_tx, mut done_rx) = oneshot::channel();
        let listener_token = token.clone();
        let listener_task = tokio::spawn(async move {
            let result = listen(address, listener, router, listener_token).await;
            let _ = done_tx.send(result);
        });

        tokio::pin!(shutdown);
        tokio::select! {
            _ = &mut shutdown => {
                info!("[Gateway] Shutdown requested");
            }
            result = &mut done_rx => {
                return match result {
                    Ok(Ok(())) => {
                        transition(LifecycleState::Stopped);
                        Ok(())
                    }
                    Ok(Err(e)) => {
                        error!("[Gateway] {}", e);
                        Err(e)
                    }
                    Err(_) => {
                        error!("[Gateway] {}", ServerError::ListenerLost);
                        Err(ServerError::ListenerLost)
                    }
                };
            }
        }

        transition(LifecycleState::ShuttingDown);
        token.cancel();

        match tokio::time::timeout(timeout, &mut done_rx).await {
            Ok(Ok(Ok(()))) => {
                transition(LifecycleState::Stopped);
                Ok(())
            }
            Ok(Ok(Err(ServerError::Serve(e)))) => {
                let err = ServerError::AfterShutdown(e);
                error!("[Gateway] {}", err);
                Err(err)
            }
            Ok(Ok(Err(e))) => {
                error!("[Gateway] {}", e);
                Err(e)
            }
            Ok(Err(_)) => {
                error!("[Gateway] {}", ServerError::ListenerLost);
                Err(ServerError::ListenerLost)
            }
            Err(_) => {
                error!(
                    "[Gateway] Graceful shutdown exceeded {:?}, closing remaining connections",
                    timeout
                );
                // Dropping the listener task drops its connection set
                listener_task.abort();
                let _ = listener_task.await;
                Err(ServerError::ShutdownTimeout(timeout))
            }
        }
    }
}

async fn listen(
    address: String,
    listener: Option<TcpListener>,
    router: Router,
    token: CancellationToken,
) -> Result<(), ServerError> {
    let listener = match listener {
        Some(listener) => listener,
        None => TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?,
    };

    match listener.local_addr() {
        Ok(local) => info!(address = %local, "[Gateway] Ready to accept connections"),
        Err(_) => info!(address = %address, "[Gateway] Ready to accept connections"),
    }
    transition(LifecycleState::Listening);

    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accepted = listener.accept() => {
                let (stream, remote) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) if is_connection_error(&e) => {
                        debug!("[Gateway] Dropped connection during accept: {}", e);
                        continue;
                    }
                    Err(e) => return Err(ServerError::Serve(e)),
                };
                connections.spawn(serve_connection(
                    stream,
                    remote,
                    router.clone(),
                    token.clone(),
                ));
            }
        }
    }

    drop(listener);
    debug!(open = connections.len(), "[Gateway] Draining connections");
    while connections.join_next().await.is_some() {}
    Ok(())
}

/// Serve one connection, finishing in-flight requests once `token` fires
async fn serve_connection(
    stream: TcpStream,
    remote: SocketAddr,
    router: Router,
    token: CancellationToken,
) {
    let builder = auto::Builder::new(TokioExecutor::new());
    let conn = builder
        .serve_connection_with_upgrades(TokioIo::new(stream), TowerToHyperService::new(router));
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = token.cancelled() => {
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };
    if let Err(e) = result {
        debug!(remote = %remote, "[Gateway] Connection closed with error: {}", e);
    }
}

fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}
