//! Shared types for the research-notes module service and its RPC clients.

use serde::{Deserialize, Serialize};

// =====================================================
// RPC Request Types
// =====================================================

/// A note proposed by an agent.
///
/// Either `markdown` carries the complete document (YAML frontmatter + body),
/// or the structured `title` / `date` / `tags` / `body` fields are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitNoteRequest {
    /// Target filename, e.g. `2025-11-23-aws-lambda-best-practices.md`
    pub filename: String,
    /// Full document including frontmatter (takes precedence over the fields below)
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Frontmatter date, `YYYY-MM-DD` or a timestamp starting with it
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub body: Option<String>,
}

// =====================================================
// RPC Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// =====================================================
// Domain Types
// =====================================================

/// Normalized note returned by `/rpc/validate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedNote {
    pub path: String,
    pub slug: String,
    pub date: String,
    pub title: String,
    pub tags: Vec<String>,
    /// Rendered document (frontmatter + body) that would be published
    pub document: String,
}

/// Result of a successful `/rpc/submit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResult {
    pub path: String,
    /// `true` when the note did not exist before this write
    pub created: bool,
    pub commit_sha: String,
    /// Blob SHA of the written file (the next update's precondition)
    pub content_sha: String,
    #[serde(default)]
    pub commit_url: Option<String>,
    /// Where the static site will publish the note, if a site URL is configured
    #[serde(default)]
    pub published_url: Option<String>,
}

/// Service health status
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub repository: String,
    pub branch: String,
    pub total_submissions: u64,
    pub total_conflicts: u64,
}
