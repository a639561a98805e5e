//! Typed HTTP client for the GitHub contents API.

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use std::time::Duration;

use crate::error::ApiError;
use crate::payload::PutFileRequest;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("research-notes/", env!("CARGO_PKG_VERSION"));

/// A file as currently stored in the remote repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    pub path: String,
    pub commit_sha: String,
    /// Blob SHA of the new file version
    pub content_sha: String,
    pub commit_url: Option<String>,
    /// `true` if the write created the path
    pub created: bool,
}

/// Path-addressed remote content store with blob-SHA preconditions
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Look up the file at `path` on `branch`; `None` if it does not exist
    async fn get_file(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>, ApiError>;

    /// Create or update `path`. Must fail with `ApiError::StaleSha` when
    /// `req.sha` is not the current blob SHA (or is missing for an existing path).
    async fn put_file(&self, path: &str, req: &PutFileRequest) -> Result<CommitRef, ApiError>;
}

// ── GitHub API types ────────────────────────────────

#[derive(Debug, Deserialize)]
struct GhContentItem {
    #[serde(default)]
    path: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: String,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhPutResponse {
    content: GhContentItem,
    commit: GhCommit,
}

#[derive(Debug, Deserialize)]
struct GhErrorBody {
    #[serde(default)]
    message: String,
}

// ── Client impl ─────────────────────────────────────

pub struct GitHubContentsClient {
    base_url: String,
    owner: String,
    repo: String,
    token: String,
    client: reqwest::Client,
}

impl GitHubContentsClient {
    pub fn new(base_url: &str, owner: &str, repo: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Apply a per-request timeout to every call
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ApiError> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            self.owner,
            self.repo,
            encoded.join("/")
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

#[async_trait]
impl ContentApi for GitHubContentsClient {
    async fn get_file(&self, path: &str, branch: &str) -> Result<Option<RemoteFile>, ApiError> {
        let resp = self
            .request(reqwest::Method::GET, &self.contents_url(path))
            .query(&[("ref", branch)])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = error_message(resp).await;
            return Err(classify_status(path, status, message));
        }

        let item: GhContentItem = resp
            .json()
            .await
            .map_err(|e| ApiError::Transport(format!("Parse contents response: {}", e)))?;

        Ok(Some(RemoteFile {
            path: if item.path.is_empty() {
                path.to_string()
            } else {
                item.path
            },
            sha: item.sha,
        }))
    }

    async fn put_file(&self, path: &str, req: &PutFileRequest) -> Result<CommitRef, ApiError> {
        let resp = self
            .request(reqwest::Method::PUT, &self.contents_url(path))
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = error_message(resp).await;
            return Err(classify_status(path, status, message));
        }

        let body: GhPutResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Transport(format!("Parse write response: {}", e)))?;

        Ok(CommitRef {
            path: if body.content.path.is_empty() {
                path.to_string()
            } else {
                body.content.path
            },
            commit_sha: body.commit.sha,
            content_sha: body.content.sha,
            commit_url: body.commit.html_url,
            created: status == StatusCode::CREATED,
        })
    }
}

async fn error_message(resp: reqwest::Response) -> String {
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<GhErrorBody>(&text) {
        Ok(body) if !body.message.is_empty() => body.message,
        _ => text,
    }
}

/// Map a non-success status onto the error taxonomy.
///
/// 409 is a SHA mismatch. 422 is only a precondition failure when the message
/// is about the `sha` field; other 422s are plain validation errors.
fn classify_status(path: &str, status: StatusCode, message: String) -> ApiError {
    match status {
        StatusCode::CONFLICT => ApiError::StaleSha {
            path: path.to_string(),
            message,
        },
        StatusCode::UNPROCESSABLE_ENTITY if message.to_lowercase().contains("sha") => {
            ApiError::StaleSha {
                path: path.to_string(),
                message,
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
