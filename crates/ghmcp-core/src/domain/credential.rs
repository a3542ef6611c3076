//! Credential context - per-request bearer tokens
//!
//! The HTTP middleware attaches the caller's token to the request, the MCP
//! handler turns the request into an [`ExecutionContext`], and the client
//! factory asks a [`TokenResolver`] for the token when it builds upstream
//! clients. Tokens are trimmed on the way in and validated on the way out.

use std::fmt;
use std::sync::Arc;

use http::Extensions;
use thiserror::Error;

/// Why a credential could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("context is missing")]
    MissingContext,

    #[error("missing authentication token")]
    MissingToken,

    #[error("github token not provided")]
    NotProvided,
}

/// A non-empty, trimmed bearer token.
///
/// `Debug` output is redacted so the value never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Arc<str>);

impl BearerToken {
    /// Trim `raw` and accept it if anything is left.
    pub fn new(raw: &str) -> Result<Self, CredentialError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::MissingToken);
        }
        Ok(Self(Arc::from(trimmed)))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Extension slot holding the raw (trimmed, possibly empty) token.
#[derive(Clone)]
struct TokenSlot(Arc<str>);

/// Store the trimmed token in a request's extensions. Never fails.
pub fn attach_token(extensions: &mut Extensions, raw: &str) {
    extensions.insert(TokenSlot(Arc::from(raw.trim())));
}

/// Request-scoped, typed key-value carrier.
///
/// Cheap to clone; values are chained in with [`ExecutionContext::with`] and
/// read back by type.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    extensions: Extensions,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the extensions of an inbound HTTP request
    pub fn from_extensions(extensions: Extensions) -> Self {
        Self { extensions }
    }

    /// Return a context that additionally carries `value`
    pub fn with<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Return a context carrying the trimmed token
    pub fn with_token(mut self, raw: &str) -> Self {
        attach_token(&mut self.extensions, raw);
        self
    }

    /// The token attached to this context, if any
    pub fn token(&self) -> Result<BearerToken, CredentialError> {
        let slot = self
            .extensions
            .get::<TokenSlot>()
            .ok_or(CredentialError::MissingToken)?;
        BearerToken::new(&slot.0)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("authenticated", &self.token().is_ok())
            .finish_non_exhaustive()
    }
}

/// Attach `raw` to `ctx`, starting from an empty context when none is given.
pub fn context_with_token(ctx: Option<ExecutionContext>, raw: &str) -> ExecutionContext {
    ctx.unwrap_or_default().with_token(raw)
}

/// Retrieve the token from a context.
///
/// # Errors
///
/// [`CredentialError::MissingContext`] without a context,
/// [`CredentialError::MissingToken`] when no non-empty token is attached.
pub fn token_from_context(ctx: Option<&ExecutionContext>) -> Result<BearerToken, CredentialError> {
    ctx.ok_or(CredentialError::MissingContext)?.token()
}

/// Source of the token used for upstream API calls
pub trait TokenResolver: Send + Sync {
    fn resolve(&self, ctx: &ExecutionContext) -> Result<BearerToken, CredentialError>;
}

/// Reads the token attached to the request context (HTTP transport)
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextTokenResolver;

impl TokenResolver for ContextTokenResolver {
    fn resolve(&self, ctx: &ExecutionContext) -> Result<BearerToken, CredentialError> {
        token_from_context(Some(ctx))
    }
}

/// Returns one preconfigured token regardless of the request
#[derive(Debug, Clone)]
pub struct StaticTokenResolver {
    token: Option<BearerToken>,
}

impl StaticTokenResolver {
    pub fn new(raw: &str) -> Self {
        Self {
            token: BearerToken::new(raw).ok(),
        }
    }
}

impl TokenResolver for StaticTokenResolver {
    fn resolve(&self, _ctx: &ExecutionContext) -> Result<BearerToken, CredentialError> {
        self.token.clone().ok_or(CredentialError::NotProvided)
    }
}
