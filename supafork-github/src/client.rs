//! GitHub REST API client
//!
//! Talks to the git data endpoints (repository metadata, trees, blobs)
//! directly over HTTP. Requests work without a token against public
//! repositories; a token raises the rate limit.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use supafork_core::types::{DirectoryEntry, EntryKind};
use supafork_core::Config;

use crate::{Error, Result};

/// User agent sent with every request (GitHub rejects requests without one)
const USER_AGENT: &str = concat!("supafork/", env!("CARGO_PKG_VERSION"));

/// GitHub API client for repository verification and content fetching
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
    fetch_concurrency: usize,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// The token is optional; callers typically obtain it from
    /// `Secrets::github_token()`.
    pub fn new(config: &Config, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.github.request_timeout)
            .build()?;

        let api_base = config.github.api_base.trim_end_matches('/').to_string();

        info!(api_base = %api_base, authenticated = token.is_some(), "Created GitHub client");

        Ok(Self {
            http,
            api_base,
            token,
            // A zero limit would allow no fetches at all
            fetch_concurrency: config.fork.fetch_concurrency.max(1),
        })
    }

    /// Base URL of the REST API this client talks to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub(crate) fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    /// Fetch repository metadata
    ///
    /// A missing or private repository comes back as `RepoNotFound` with the
    /// API's own message; GitHub reports both cases identically.
    pub(crate) async fn repository(&self, full_name: &str) -> Result<RepoMetadata> {
        let url = format!("{}/repos/{}", self.api_base, full_name);
        match self.get(&url).await? {
            ApiReply::Payload(meta) => Ok(meta),
            ApiReply::ApiError(message) => Err(Error::RepoNotFound(message)),
        }
    }

    /// Fetch the recursive tree of a branch
    pub(crate) async fn tree(&self, full_name: &str, tree_ref: &str) -> Result<TreeResponse> {
        let url = format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.api_base, full_name, tree_ref
        );
        self.tree_by_url(&url).await
    }

    /// Fetch a tree from an API URL reported by a previous tree response
    pub(crate) async fn tree_by_url(&self, url: &str) -> Result<TreeResponse> {
        match self.get(url).await? {
            ApiReply::Payload(tree) => Ok(tree),
            ApiReply::ApiError(message) => Err(Error::Upstream(message)),
        }
    }

    /// Perform one GET request and separate transport failures from errors
    /// the API itself reported
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<ApiReply<T>> {
        debug!(url = %url, "GitHub API request");

        let mut request = self.http.get(url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let payload = serde_json::from_slice(&body).map_err(|e| {
                Error::Parse(format!("Unexpected response from {}: {}", url, e))
            })?;
            return Ok(ApiReply::Payload(payload));
        }

        // Error responses carry {"message": "..."}; keep that message verbatim
        let message = serde_json::from_slice::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| format!("HTTP {}", status));

        debug!(url = %url, status = %status, message = %message, "GitHub API error response");

        Ok(ApiReply::ApiError(message))
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .finish_non_exhaustive()
    }
}

/// Outcome of one API request: the parsed payload, or the error message the
/// API reported in its response body
pub(crate) enum ApiReply<T> {
    Payload(T),
    ApiError(String),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Repository metadata (subset of the full response)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RepoMetadata {
    pub full_name: String,
    pub default_branch: String,
}

/// A git tree, possibly recursive
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TreeResponse {
    pub sha: String,
    pub url: String,
    #[serde(default)]
    pub tree: Vec<TreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

/// One item of a git tree
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TreeItem {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl From<TreeItem> for DirectoryEntry {
    fn from(item: TreeItem) -> Self {
        let kind = match item.kind.as_str() {
            "blob" => EntryKind::Blob,
            "tree" => EntryKind::Tree,
            _ => EntryKind::Other,
        };

        DirectoryEntry {
            path: item.path,
            kind,
            object_id: item.sha,
            content_url: item.url,
            size: item.size,
        }
    }
}

/// A git blob's content in transport encoding
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BlobResponse {
    pub content: String,
    pub encoding: String,
}

/// Parse a repository reference into a "owner/repo" full name
///
/// Supports formats:
/// - owner/repo
/// - https://github.com/owner/repo
/// - git@github.com:owner/repo.git
pub fn parse_repository_name(reference: &str) -> Result<String> {
    // Handle HTTPS URL: https://github.com/owner/repo
    if reference.starts_with("https://") || reference.starts_with("http://") {
        let url = url::Url::parse(reference).map_err(|e| Error::Parse(e.to_string()))?;
        let path = url.path().trim_start_matches('/').trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok(format!("{}/{}", parts[0], parts[1]));
        }
        return Err(Error::Parse(format!("Invalid GitHub URL path: {}", path)));
    }

    // Handle SSH URL: git@github.com:owner/repo.git
    if reference.starts_with("git@") {
        if let Some(path) = reference.split(':').nth(1) {
            let path = path.trim_end_matches(".git");
            let parts: Vec<&str> = path.split('/').collect();
            if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
                return Ok(format!("{}/{}", parts[0], parts[1]));
            }
        }
        return Err(Error::Parse(format!("Invalid SSH URL: {}", reference)));
    }

    // Simple owner/repo format
    let parts: Vec<&str> = reference.split('/').collect();
    if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
        return Ok(format!(
            "{}/{}",
            parts[0],
            parts[1].trim_end_matches(".git")
        ));
    }

    Err(Error::Parse(format!(
        "Invalid repository format: {}. Expected owner/repo",
        reference
    )))
}
