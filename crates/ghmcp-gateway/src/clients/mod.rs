//! Upstream GitHub clients
//!
//! [`ClientFactory`] builds REST, GraphQL and raw-content clients per request.
//! Each client carries the caller's bearer token and the current
//! identification string; only the connection pool is shared.

mod error;
mod graphql;
mod raw;
mod rest;
pub mod transport;

pub use error::ClientError;
pub use graphql::GraphQlClient;
pub use raw::{ContentOptions, RawClient};
pub use rest::RestClient;

use std::sync::Arc;

use ghmcp_core::{branding, ExecutionContext, HostEndpoints, TokenResolver};
use http::HeaderValue;
use parking_lot::RwLock;
use tracing::debug;

use transport::Transport;

/// Builds per-request upstream clients
pub struct ClientFactory {
    endpoints: Arc<HostEndpoints>,
    resolver: Arc<dyn TokenResolver>,
    default_identification: Arc<str>,
    identification: RwLock<Arc<str>>,
    http: reqwest::Client,
}

impl ClientFactory {
    pub fn new(
        endpoints: Arc<HostEndpoints>,
        resolver: Arc<dyn TokenResolver>,
        version: &str,
    ) -> Self {
        Self::with_http_client(endpoints, resolver, version, reqwest::Client::new())
    }

    /// Use a caller-provided connection pool
    pub fn with_http_client(
        endpoints: Arc<HostEndpoints>,
        resolver: Arc<dyn TokenResolver>,
        version: &str,
        http: reqwest::Client,
    ) -> Self {
        let default_identification: Arc<str> = Arc::from(branding::default_user_agent(version));
        Self {
            endpoints,
            resolver,
            identification: RwLock::new(default_identification.clone()),
            default_identification,
            http,
        }
    }

    pub fn endpoints(&self) -> &HostEndpoints {
        &self.endpoints
    }

    /// Current identification snapshot
    pub fn identification(&self) -> Arc<str> {
        self.identification.read().clone()
    }

    /// Replace the identification string.
    ///
    /// Blank input, or input that is not a valid header value, restores the
    /// default. Last writer wins.
    pub fn set_identification(&self, value: &str) {
        let trimmed = value.trim();
        let next = if trimmed.is_empty() || HeaderValue::from_str(trimmed).is_err() {
            self.default_identification.clone()
        } else {
            Arc::from(trimmed)
        };
        debug!(identification = %next, "Updated upstream identification");
        *self.identification.write() = next;
    }

    fn transport(&self, ctx: &ExecutionContext) -> Result<Transport, ClientError> {
        let token = self
            .resolver
            .resolve(ctx)
            .map_err(ClientError::Unauthenticated)?;
        let agent = self.identification();
        Transport::layered(self.http.clone(), &token, &agent)
    }

    pub fn rest_client(&self, ctx: &ExecutionContext) -> Result<RestClient, ClientError> {
        let transport = self.transport(ctx)?;
        Ok(RestClient::new(
            transport,
            self.endpoints.rest_url().clone(),
            self.endpoints.upload_url().clone(),
        ))
    }

    pub fn graphql_client(&self, ctx: &ExecutionContext) -> Result<GraphQlClient, ClientError> {
        let transport = self.transport(ctx)?;
        Ok(GraphQlClient::new(
            transport,
            self.endpoints.graphql_url().clone(),
        ))
    }

    pub fn raw_client(&self, ctx: &ExecutionContext) -> Result<RawClient, ClientError> {
        let rest = self.rest_client(ctx)?;
        Ok(RawClient::new(rest, self.endpoints.raw_url().clone()))
    }
}
