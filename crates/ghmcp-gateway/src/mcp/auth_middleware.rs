//! Bearer authentication middleware for the MCP endpoint
//!
//! Extracts the caller's GitHub token from `Authorization: Bearer <token>`
//! and attaches it to the request extensions. Token validation is left to
//! GitHub; requests without a usable bearer credential are rejected with 401
//! before they reach the MCP service.

use axum::{
    body::Body,
    extract::Request,
    http::{header, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use ghmcp_core::{attach_token, branding};
use tracing::warn;

use crate::logging::TraceContext;

/// Why a request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingHeader,
    InvalidHeader,
    MissingToken,
}

impl AuthRejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingHeader => "missing Authorization header",
            Self::InvalidHeader => "invalid Authorization header",
            Self::MissingToken => "missing bearer token",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response<Body> {
        (
            StatusCode::UNAUTHORIZED,
            [
                (header::WWW_AUTHENTICATE, branding::www_authenticate_challenge()),
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            ],
            self.message(),
        )
            .into_response()
    }
}

/// Parse an `Authorization` header value into the raw bearer token
pub fn parse_bearer(value: Option<&[u8]>) -> Result<&str, AuthRejection> {
    let Some(bytes) = value else {
        return Err(AuthRejection::MissingHeader);
    };
    let value = std::str::from_utf8(bytes)
        .map_err(|_| AuthRejection::InvalidHeader)?
        .trim();
    if value.is_empty() {
        return Err(AuthRejection::MissingHeader);
    }

    let mut parts = value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().ok_or(AuthRejection::InvalidHeader)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthRejection::InvalidHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthRejection::MissingToken);
    }
    Ok(token)
}

/// Reject requests without a bearer token, attach the token otherwise
pub async fn bearer_auth_middleware(mut request: Request, next: Next) -> Response<Body> {
    let parsed = parse_bearer(
        request
            .headers()
            .get(header::AUTHORIZATION)
            .map(|v| v.as_bytes()),
    )
    .map(str::to_owned);

    match parsed {
        Ok(token) => {
            attach_token(request.extensions_mut(), &token);
            next.run(request).await
        }
        Err(rejection) => {
            let trace_id = request
                .extensions()
                .get::<TraceContext>()
                .map(|ctx| ctx.trace_id.as_str())
                .unwrap_or("-");
            warn!(
                trace_id = %trace_id,
                reason = rejection.message(),
                "Rejected unauthenticated MCP request"
            );
            rejection.into_response()
        }
    }
}
