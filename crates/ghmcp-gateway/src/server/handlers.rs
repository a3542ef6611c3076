use axum::{http::header, response::IntoResponse};
use tracing::debug;

/// Liveness check. Served for GET and HEAD; HEAD responses carry no body.
pub async fn health() -> impl IntoResponse {
    debug!("Health check");
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "ok\n")
}
