//! Centralized branding constants
//!
//! All product naming comes from this module.
//!
//! # Usage
//!
//! ```rust
//! use ghmcp_core::branding;
//!
//! let agent = branding::default_user_agent("1.2.3");
//! assert_eq!(agent, "github-mcp-http/1.2.3");
//! ```

/// Product token used in the outbound `User-Agent`
pub const PRODUCT_NAME: &str = "github-mcp-http";

/// Name reported to MCP clients in `serverInfo`
pub const SERVER_NAME: &str = "github-mcp-server";

/// Human-readable name
pub const DISPLAY_NAME: &str = "GitHub MCP Server";

/// Realm advertised in `WWW-Authenticate` challenges
pub const AUTH_REALM: &str = "github-mcp-server";

/// Default `User-Agent` for a given server version
pub fn default_user_agent(version: &str) -> String {
    format!("{}/{}", PRODUCT_NAME, version)
}

/// `User-Agent` reported once an MCP client has identified itself
///
/// # Example
/// ```
/// use ghmcp_core::branding;
///
/// let agent = branding::client_user_agent("1.0.0", "vscode", "1.99");
/// assert_eq!(agent, "github-mcp-http/1.0.0 (vscode/1.99)");
/// ```
pub fn client_user_agent(version: &str, client_name: &str, client_version: &str) -> String {
    format!(
        "{}/{} ({}/{})",
        PRODUCT_NAME, version, client_name, client_version
    )
}

/// Value of the `WWW-Authenticate` header sent with 401 responses
pub fn www_authenticate_challenge() -> String {
    format!("Bearer realm=\"{}\"", AUTH_REALM)
}
