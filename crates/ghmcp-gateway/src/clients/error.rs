use ghmcp_core::CredentialError;
use thiserror::Error;

/// Errors from building or using an upstream client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to get GitHub token: {0}")]
    Unauthenticated(#[source] CredentialError),

    #[error("invalid {0} header value")]
    InvalidHeader(&'static str),

    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),
}

impl ClientError {
    /// HTTP status reported by the upstream API, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
