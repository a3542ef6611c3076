//! `repos` toolset - repository contents and metadata

use std::sync::Arc;

use ghmcp_core::ExecutionContext;
use http::Method;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::params::{json_result, optional_str, repo_segment, required_str};
use super::{schema, ServerTool, ToolCallError, ToolDeps, ToolResult, Toolset};
use crate::clients::ContentOptions;

pub(super) fn toolset() -> Toolset {
    Toolset::new("repos", "GitHub Repository related tools")
        .with_instructions(
            "Pass ref or sha to get_file_contents to read a specific revision; without either \
             the default branch is used. Paths ending in '/' list a directory.",
        )
        .add_read_tools([get_file_contents(), get_repository_summary()])
        .add_write_tools([star_repository()])
}

fn owner_repo_properties() -> serde_json::Value {
    json!({
        "owner": { "type": "string", "description": "Repository owner (username or organization)" },
        "repo": { "type": "string", "description": "Repository name" }
    })
}

fn get_file_contents() -> ServerTool {
    let mut properties = owner_repo_properties();
    if let Some(map) = properties.as_object_mut() {
        map.insert(
            "path".to_string(),
            json!({ "type": "string", "description": "Path to file or directory", "default": "/" }),
        );
        map.insert(
            "ref".to_string(),
            json!({ "type": "string", "description": "Git ref such as refs/heads/main or a branch name" }),
        );
        map.insert(
            "sha".to_string(),
            json!({ "type": "string", "description": "Commit SHA; takes precedence over ref" }),
        );
    }
    let tool = Tool::new(
        "get_file_contents",
        "Get the contents of a file or directory from a GitHub repository",
        schema(json!({
            "type": "object",
            "properties": properties,
            "required": ["owner", "repo"]
        })),
    );
    ServerTool::new(tool, get_file_contents_handler)
}

/// Directory entry as returned by the contents API
#[derive(Debug, Serialize, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    size: Option<u64>,
    sha: Option<String>,
}

async fn get_file_contents_handler(
    deps: Arc<ToolDeps>,
    ctx: ExecutionContext,
    args: JsonObject,
) -> ToolResult {
    let owner = repo_segment(&args, "owner")?;
    let repo = repo_segment(&args, "repo")?;
    let path = optional_str(&args, "path")?.unwrap_or_else(|| "/".to_string());
    let opts = ContentOptions {
        git_ref: optional_str(&args, "ref")?,
        sha: optional_str(&args, "sha")?,
    };

    if path.ends_with('/') {
        return list_directory(&deps, &ctx, &owner, &repo, &path, &opts).await;
    }

    let client = deps.clients.raw_client(&ctx)?;
    let response = client.get_raw_content(&owner, &repo, &path, &opts).await?;
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = response.bytes().await.map_err(crate::clients::ClientError::from)?;

    match std::str::from_utf8(&bytes) {
        Ok(text) => {
            let (window, truncated) = content_window(text, deps.content_window_size);
            debug!(
                path = %path,
                bytes = bytes.len(),
                truncated,
                "Fetched raw file contents"
            );
            let mut content = vec![Content::text(window)];
            if truncated {
                content.push(Content::text(format!(
                    "[output truncated to the first {} lines]",
                    deps.content_window_size
                )));
            }
            Ok(CallToolResult::success(content))
        }
        Err(_) => Ok(CallToolResult::success(vec![Content::text(format!(
            "{} is a binary file ({}, {} bytes)",
            path,
            content_type,
            bytes.len()
        ))])),
    }
}

async fn list_directory(
    deps: &ToolDeps,
    ctx: &ExecutionContext,
    owner: &str,
    repo: &str,
    path: &str,
    opts: &ContentOptions,
) -> ToolResult {
    let client = deps.clients.rest_client(ctx)?;
    let dir = path.trim_matches('/');
    let mut builder = client.request(
        Method::GET,
        &format!("repos/{}/{}/contents/{}", owner, repo, dir),
    )?;
    if let Some(revision) = opts.sha.as_ref().or(opts.git_ref.as_ref()) {
        builder = builder.query(&[("ref", revision)]);
    }
    let entries: Vec<ContentEntry> = client
        .send(builder)
        .await?
        .json()
        .await
        .map_err(crate::clients::ClientError::from)?;
    json_result(&entries)
}

/// First `max_lines` lines of `text`, and whether anything was cut
fn content_window(text: &str, max_lines: usize) -> (String, bool) {
    if max_lines == 0 {
        return (text.to_string(), false);
    }
    let mut lines = text.split_inclusive('\n');
    let kept: String = lines.by_ref().take(max_lines).collect();
    let truncated = lines.next().is_some();
    (kept, truncated)
}

fn get_repository_summary() -> ServerTool {
    let tool = Tool::new(
        "get_repository_summary",
        "Get a summary of a GitHub repository: description, default branch, language and counts",
        schema(json!({
            "type": "object",
            "properties": owner_repo_properties(),
            "required": ["owner", "repo"]
        })),
    );
    ServerTool::new(tool, get_repository_summary_handler)
}

const REPOSITORY_SUMMARY_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    nameWithOwner
    description
    url
    isPrivate
    isArchived
    stargazerCount
    forkCount
    primaryLanguage { name }
    defaultBranchRef { name }
    updatedAt
  }
}
"#;

#[derive(Debug, Deserialize)]
struct RepositoryQuery {
    repository: Option<serde_json::Value>,
}

async fn get_repository_summary_handler(
    deps: Arc<ToolDeps>,
    ctx: ExecutionContext,
    args: JsonObject,
) -> ToolResult {
    let owner = required_str(&args, "owner")?;
    let repo = required_str(&args, "repo")?;

    let client = deps.clients.graphql_client(&ctx)?;
    let data: RepositoryQuery = client
        .query(
            REPOSITORY_SUMMARY_QUERY,
            json!({ "owner": owner, "name": repo }),
        )
        .await?;

    match data.repository {
        Some(repository) => json_result(&repository),
        None => Err(ToolCallError::InvalidParams(format!(
            "repository {}/{} not found",
            owner, repo
        ))),
    }
}

fn star_repository() -> ServerTool {
    let tool = Tool::new(
        "star_repository",
        "Star a GitHub repository as the authenticated user",
        schema(json!({
            "type": "object",
            "properties": owner_repo_properties(),
            "required": ["owner", "repo"]
        })),
    );
    ServerTool::new(tool, star_repository_handler)
}

async fn star_repository_handler(
    deps: Arc<ToolDeps>,
    ctx: ExecutionContext,
    args: JsonObject,
) -> ToolResult {
    let owner = repo_segment(&args, "owner")?;
    let repo = repo_segment(&args, "repo")?;

    let client = deps.clients.rest_client(&ctx)?;
    let builder = client
        .request(Method::PUT, &format!("user/starred/{}/{}", owner, repo))?
        .header(http::header::CONTENT_LENGTH, "0");
    client.send(builder).await?;

    Ok(CallToolResult::success(vec![Content::text(format!(
        "Successfully starred repository {}/{}",
        owner, repo
    ))]))
}
