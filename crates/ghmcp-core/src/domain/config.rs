//! HTTP server configuration and its normalization rules

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_ENDPOINT_PATH: &str = "/mcp";
pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONTENT_WINDOW_SIZE: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("health path {0:?} collides with the MCP endpoint path")]
    PathCollision(String),

    #[error("invalid duration {0:?} (expected e.g. 500ms, 10s, 1m30s)")]
    InvalidDuration(String),
}

/// Everything the HTTP server needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig {
    /// Server version, reported to MCP clients and in the `User-Agent`
    pub version: String,
    /// GitHub host; empty means github.com
    pub host: String,
    pub enabled_toolsets: Vec<String>,
    pub dynamic_toolsets: bool,
    pub read_only: bool,
    /// Maximum number of lines returned for file contents
    pub content_window_size: usize,
    pub listen_address: String,
    pub endpoint_path: String,
    pub health_path: String,
    pub shutdown_timeout: Duration,
    pub log_file_path: Option<PathBuf>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            host: String::new(),
            enabled_toolsets: vec!["all".to_string()],
            dynamic_toolsets: false,
            read_only: false,
            content_window_size: DEFAULT_CONTENT_WINDOW_SIZE,
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            log_file_path: None,
        }
    }
}

impl HttpServerConfig {
    /// Apply defaults to empty fields and canonicalize paths.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PathCollision`] when the health path and the MCP
    /// endpoint path normalize to the same value.
    pub fn normalize(mut self) -> Result<Self, ConfigError> {
        self.listen_address = normalize_listen_address(&self.listen_address);
        self.endpoint_path = normalize_path(&self.endpoint_path, DEFAULT_ENDPOINT_PATH);
        self.health_path = normalize_path(&self.health_path, DEFAULT_HEALTH_PATH);
        if self.shutdown_timeout.is_zero() {
            self.shutdown_timeout = DEFAULT_SHUTDOWN_TIMEOUT;
        }
        if self.health_path == self.endpoint_path {
            return Err(ConfigError::PathCollision(self.health_path));
        }
        Ok(self)
    }
}

/// Empty ⇒ `fallback`; ensure a leading slash; strip a trailing slash unless
/// the result is the root.
pub fn normalize_path(path: &str, fallback: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Empty ⇒ `0.0.0.0:8080`; `:port` ⇒ `0.0.0.0:port`
pub fn normalize_listen_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return DEFAULT_LISTEN_ADDRESS.to_string();
    }
    match trimmed.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => trimmed.to_string(),
    }
}

/// Parse a Go-style duration (`500ms`, `1.5s`, `1m30s`, `1h`) or a bare
/// number of seconds
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let s = input.trim();
    let invalid = || ConfigError::InvalidDuration(input.to_string());

    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number(c)).ok_or_else(invalid)?;
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let unit_len = tail.find(is_number).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        nanos += value * scale;
        rest = next;
    }

    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}
