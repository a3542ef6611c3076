//! REST API client

use http::header::ACCEPT;
use http::Method;
use serde::de::DeserializeOwned;
use url::Url;

use super::transport::{check_status, Transport};
use super::ClientError;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

/// Client for the REST API, bound to one caller's credential
#[derive(Clone)]
pub struct RestClient {
    transport: Transport,
    base_url: Url,
    upload_url: Url,
}

impl RestClient {
    pub(crate) fn new(transport: Transport, base_url: Url, upload_url: Url) -> Self {
        Self {
            transport,
            base_url,
            upload_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    /// Build a request for `path`, relative to the REST base
    pub fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        Ok(self.with_api_headers(self.transport.request(method, url)))
    }

    /// Build a request for `path`, relative to the upload base
    pub fn upload_request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = self.upload_url.join(path.trim_start_matches('/'))?;
        Ok(self.with_api_headers(self.transport.request(method, url)))
    }

    /// Request an absolute URL through the same credential and identification
    pub(crate) fn request_url(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.transport.request(method, url)
    }

    fn with_api_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// Execute a request; non-2xx responses become [`ClientError::Api`]
    pub async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self.transport.execute(builder).await?;
        check_status(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Ok(response.json().await?)
    }
}
