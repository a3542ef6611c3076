//! Host resolution - maps a configured GitHub hostname to API endpoints
//!
//! Three deployment kinds are supported:
//! - github.com (the public endpoints, also used when no host is configured)
//! - GitHub Enterprise Cloud with data residency (`*.ghe.com`), subdomain based
//! - GitHub Enterprise Server, path based under the configured origin
//!
//! Resolution runs once at startup; the result is shared by every request.

use thiserror::Error;
use url::Url;

const DOTCOM_SUFFIX: &str = "github.com";
const GHEC_SUFFIX: &str = "ghe.com";

const DOTCOM_REST_URL: &str = "https://api.github.com/";
const DOTCOM_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const DOTCOM_UPLOAD_URL: &str = "https://uploads.github.com/";
const DOTCOM_RAW_URL: &str = "https://raw.githubusercontent.com/";

/// Errors produced while resolving the configured host
#[derive(Debug, Error)]
pub enum HostError {
    #[error("could not parse host as URL: {input}")]
    Unparseable {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("host must have a scheme (http or https): {0}")]
    MissingScheme(String),

    #[error("unsupported host scheme {scheme:?} (expected http or https): {input}")]
    UnsupportedScheme { scheme: String, input: String },

    #[error("host URL has no hostname: {0}")]
    MissingHost(String),

    #[error("GHEC URL must be HTTPS: {0}")]
    InsecureEnterpriseCloud(String),

    #[error("failed to build {endpoint} URL for {kind:?} host")]
    InvalidUrl {
        kind: HostKind,
        endpoint: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Deployment the endpoints point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// github.com
    Dotcom,
    /// GitHub Enterprise Cloud with data residency (`*.ghe.com`)
    EnterpriseCloud,
    /// Self-managed GitHub Enterprise Server
    EnterpriseServer,
}

/// The four base URLs of one upstream deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEndpoints {
    kind: HostKind,
    rest: Url,
    graphql: Url,
    upload: Url,
    raw: Url,
}

impl HostEndpoints {
    /// Build an endpoint set from explicit URLs.
    ///
    /// Used for deployments behind non-standard gateways and in tests.
    pub fn from_urls(kind: HostKind, rest: Url, graphql: Url, upload: Url, raw: Url) -> Self {
        Self {
            kind,
            rest,
            graphql,
            upload,
            raw,
        }
    }

    /// Endpoints for github.com
    pub fn dotcom() -> Result<Self, HostError> {
        let kind = HostKind::Dotcom;
        Ok(Self {
            kind,
            rest: endpoint(kind, "REST", DOTCOM_REST_URL.to_string())?,
            graphql: endpoint(kind, "GraphQL", DOTCOM_GRAPHQL_URL.to_string())?,
            upload: endpoint(kind, "Upload", DOTCOM_UPLOAD_URL.to_string())?,
            raw: endpoint(kind, "Raw", DOTCOM_RAW_URL.to_string())?,
        })
    }

    fn enterprise_cloud(hostname: &str) -> Result<Self, HostError> {
        let kind = HostKind::EnterpriseCloud;
        Ok(Self {
            kind,
            rest: endpoint(kind, "REST", format!("https://api.{}/", hostname))?,
            graphql: endpoint(kind, "GraphQL", format!("https://api.{}/graphql", hostname))?,
            upload: endpoint(kind, "Upload", format!("https://uploads.{}/", hostname))?,
            raw: endpoint(kind, "Raw", format!("https://raw.{}/", hostname))?,
        })
    }

    fn enterprise_server(scheme: &str, authority: &str) -> Result<Self, HostError> {
        let kind = HostKind::EnterpriseServer;
        let origin = format!("{}://{}", scheme, authority);
        Ok(Self {
            kind,
            rest: endpoint(kind, "REST", format!("{}/api/v3/", origin))?,
            graphql: endpoint(kind, "GraphQL", format!("{}/api/graphql", origin))?,
            upload: endpoint(kind, "Upload", format!("{}/api/uploads/", origin))?,
            raw: endpoint(kind, "Raw", format!("{}/raw/", origin))?,
        })
    }

    pub fn kind(&self) -> HostKind {
        self.kind
    }

    /// REST API base (always ends with `/`)
    pub fn rest_url(&self) -> &Url {
        &self.rest
    }

    pub fn graphql_url(&self) -> &Url {
        &self.graphql
    }

    /// Upload API base (always ends with `/`)
    pub fn upload_url(&self) -> &Url {
        &self.upload
    }

    /// Raw content base (always ends with `/`)
    pub fn raw_url(&self) -> &Url {
        &self.raw
    }
}

fn endpoint(kind: HostKind, name: &'static str, raw: String) -> Result<Url, HostError> {
    Url::parse(&raw).map_err(|source| HostError::InvalidUrl {
        kind,
        endpoint: name,
        source,
    })
}

/// Resolve the configured host into its endpoint set.
///
/// An empty host means github.com. Anything else must be an absolute
/// `http`/`https` URL; the hostname decides the deployment kind by suffix.
///
/// # Errors
///
/// Returns a [`HostError`] when the input is not a usable URL, has no scheme,
/// or asks for plain HTTP on a `ghe.com` host.
pub fn resolve_host(host: &str) -> Result<HostEndpoints, HostError> {
    let input = host.trim();
    if input.is_empty() {
        return HostEndpoints::dotcom();
    }

    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(HostError::MissingScheme(input.to_string()))
        }
        Err(source) => {
            return Err(HostError::Unparseable {
                input: input.to_string(),
                source,
            })
        }
    };

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        // "ghe.example.com:8443" parses with "ghe.example.com" as the scheme
        if url.cannot_be_a_base() {
            return Err(HostError::MissingScheme(input.to_string()));
        }
        return Err(HostError::UnsupportedScheme {
            scheme: scheme.to_string(),
            input: input.to_string(),
        });
    }

    let hostname = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| HostError::MissingHost(input.to_string()))?;

    if hostname.ends_with(DOTCOM_SUFFIX) {
        return HostEndpoints::dotcom();
    }

    if hostname.ends_with(GHEC_SUFFIX) {
        if scheme == "http" {
            return Err(HostError::InsecureEnterpriseCloud(input.to_string()));
        }
        return HostEndpoints::enterprise_cloud(hostname);
    }

    let authority = match url.port() {
        Some(port) => format!("{}:{}", hostname, port),
        None => hostname.to_string(),
    };
    HostEndpoints::enterprise_server(scheme, &authority)
}
