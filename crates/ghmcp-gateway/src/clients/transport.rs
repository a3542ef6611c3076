//! Layered upstream transport
//!
//! Every upstream client sends through the same stack:
//!
//! ```text
//! UserAgent -> BearerAuth -> reqwest::Client (shared connection pool)
//! ```
//!
//! Each layer decorates the outgoing request and delegates to the next one.

use std::sync::Arc;

use async_trait::async_trait;
use ghmcp_core::BearerToken;
use http::header::{AUTHORIZATION, USER_AGENT};
use http::{HeaderValue, Method};
use url::Url;

use super::ClientError;

/// One step of the outbound request pipeline
#[async_trait]
pub trait RoundTrip: Send + Sync {
    async fn round_trip(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

#[async_trait]
impl RoundTrip for reqwest::Client {
    async fn round_trip(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.execute(request).await
    }
}

/// Sets `Authorization: Bearer <token>` on every request
pub struct BearerAuth<T> {
    inner: T,
    value: HeaderValue,
}

impl<T> BearerAuth<T> {
    pub fn new(inner: T, token: &BearerToken) -> Result<Self, ClientError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|_| ClientError::InvalidHeader("authorization"))?;
        value.set_sensitive(true);
        Ok(Self { inner, value })
    }
}

#[async_trait]
impl<T: RoundTrip> RoundTrip for BearerAuth<T> {
    async fn round_trip(&self, mut request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.value.clone());
        self.inner.round_trip(request).await
    }
}

/// Sets `User-Agent` on every request
pub struct UserAgent<T> {
    inner: T,
    value: HeaderValue,
}

impl<T> UserAgent<T> {
    pub fn new(inner: T, agent: &str) -> Result<Self, ClientError> {
        let value =
            HeaderValue::from_str(agent).map_err(|_| ClientError::InvalidHeader("user-agent"))?;
        Ok(Self { inner, value })
    }
}

#[async_trait]
impl<T: RoundTrip> RoundTrip for UserAgent<T> {
    async fn round_trip(&self, mut request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        request.headers_mut().insert(USER_AGENT, self.value.clone());
        self.inner.round_trip(request).await
    }
}

/// Request builder plus the layered stack that executes the built requests
#[derive(Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    stack: Arc<dyn RoundTrip>,
}

impl Transport {
    /// Assemble the full stack for one credential and identification snapshot
    pub(crate) fn layered(
        http: reqwest::Client,
        token: &BearerToken,
        agent: &str,
    ) -> Result<Self, ClientError> {
        let stack = UserAgent::new(BearerAuth::new(http.clone(), token)?, agent)?;
        Ok(Self {
            http,
            stack: Arc::new(stack),
        })
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http.request(method, url)
    }

    pub(crate) async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let request = builder.build()?;
        Ok(self.stack.round_trip(request).await?)
    }
}

/// Turn a non-2xx response into [`ClientError::Api`], using the upstream
/// `message` field when the body is a GitHub error document.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(String::from))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            }
        });

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
