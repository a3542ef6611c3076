//! GraphQL API client

use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::transport::{check_status, Transport};
use super::ClientError;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Clone)]
pub struct GraphQlClient {
    transport: Transport,
    endpoint: Url,
}

impl GraphQlClient {
    pub(crate) fn new(transport: Transport, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run `document` with `variables` and decode the `data` member.
    ///
    /// A non-empty `errors` array fails the query even when partial data came back.
    pub async fn query<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<T, ClientError> {
        let builder = self
            .transport
            .request(Method::POST, self.endpoint.clone())
            .json(&GraphQlRequest {
                query: document,
                variables,
            });
        let response = check_status(self.transport.execute(builder).await?).await?;
        let body: GraphQlResponse<T> = response.json().await?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(ClientError::GraphQl(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| ClientError::GraphQl("response contained no data".to_string()))
    }
}
