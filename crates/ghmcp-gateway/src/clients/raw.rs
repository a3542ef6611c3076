//! Raw content client
//!
//! Fetches file bytes from `<raw>/<owner>/<repo>/<ref|HEAD|sha>/<path>`.

use http::Method;
use url::Url;

use super::rest::RestClient;
use super::ClientError;

/// Revision selector for raw content. A SHA wins over a ref; neither means `HEAD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentOptions {
    pub git_ref: Option<String>,
    pub sha: Option<String>,
}

impl ContentOptions {
    fn revision(&self) -> &str {
        non_empty(&self.sha)
            .or_else(|| non_empty(&self.git_ref))
            .unwrap_or("HEAD")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct RawClient {
    rest: RestClient,
    raw_url: Url,
}

impl RawClient {
    pub(crate) fn new(rest: RestClient, raw_url: Url) -> Self {
        Self { rest, raw_url }
    }

    pub fn raw_url(&self) -> &Url {
        &self.raw_url
    }

    pub fn url_for(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        opts: &ContentOptions,
    ) -> Result<Url, ClientError> {
        let mut url = self.raw_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::Url(url::ParseError::RelativeUrlWithoutBase))?;
            segments.pop_if_empty().push(owner).push(repo);
            // "refs/heads/main" and nested file paths span several segments
            segments.extend(opts.revision().split('/').filter(|s| !s.is_empty()));
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    /// GET the raw file; a missing file surfaces as `ClientError::Api` with status 404
    pub async fn get_raw_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        opts: &ContentOptions,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.url_for(owner, repo, path, opts)?;
        self.rest.send(self.rest.request_url(Method::GET, url)).await
    }
}
