//! `context` toolset - information about the authenticated user

use std::sync::Arc;

use ghmcp_core::ExecutionContext;
use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::params::json_result;
use super::{schema, ServerTool, ToolDeps, ToolResult, Toolset};

pub(super) fn toolset() -> Toolset {
    Toolset::new(
        "context",
        "Tools that provide context about the current user and GitHub environment",
    )
    .with_instructions(
        "Call get_me first when a request refers to \"me\", \"my repositories\" or similar.",
    )
    .add_read_tools([get_me()])
}

/// The subset of `GET /user` returned to the model
#[derive(Debug, Serialize, Deserialize)]
struct MinimalUser {
    login: String,
    id: u64,
    #[serde(rename(serialize = "profile_url"))]
    html_url: Option<String>,
    avatar_url: Option<String>,
    name: Option<String>,
    company: Option<String>,
    blog: Option<String>,
    location: Option<String>,
    email: Option<String>,
    bio: Option<String>,
    public_repos: Option<u64>,
    followers: Option<u64>,
    following: Option<u64>,
    created_at: Option<String>,
}

fn get_me() -> ServerTool {
    let tool = Tool::new(
        "get_me",
        "Get details of the authenticated GitHub user. Use this when a request is about the \
         user's own profile or when information about the user is needed for other tasks.",
        schema(json!({ "type": "object", "properties": {} })),
    );
    ServerTool::new(tool, get_me_handler)
}

async fn get_me_handler(deps: Arc<ToolDeps>, ctx: ExecutionContext, _args: JsonObject) -> ToolResult {
    let client = deps.clients.rest_client(&ctx)?;
    let user: MinimalUser = client.get_json("user").await?;
    json_result(&user)
}
