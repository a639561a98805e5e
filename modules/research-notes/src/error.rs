//! Error types for note validation and publishing.

use thiserror::Error;

/// A proposed note was rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid filename '{filename}': {reason}")]
    InvalidFilename { filename: String, reason: String },

    #[error("Invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("Frontmatter date '{frontmatter_date}' does not match filename date {filename_date}")]
    DateMismatch {
        filename_date: String,
        frontmatter_date: String,
    },

    #[error("Note title is missing or empty")]
    MissingTitle,
}

/// Failure reported by a `ContentApi` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The write's SHA precondition was missing or no longer current
    #[error("Stale or missing blob SHA for {path}: {message}")]
    StaleSha { path: String, message: String },

    #[error("Remote API rejected credentials (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Remote API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// A validated note could not be written to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Another writer updated the path between our lookup and our write
    #[error("Conflicting update to {path}: expected blob {expected:?}, remote has {found:?}")]
    RemoteConflict {
        path: String,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("Authentication failed (HTTP {status}): {message}")]
    AuthFailure { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Remote API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<ApiError> for SubmitError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::StaleSha { path, .. } => SubmitError::RemoteConflict {
                path,
                expected: None,
                found: None,
            },
            ApiError::Unauthorized { status, message } => {
                SubmitError::AuthFailure { status, message }
            }
            ApiError::Status { status, message } => SubmitError::Api { status, message },
            ApiError::Transport(msg) => SubmitError::NetworkError(msg),
        }
    }
}

/// End-to-end failure of `NoteSubmitter::submit`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Missing or malformed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
