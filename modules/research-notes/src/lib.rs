//! Research notes publisher.
//!
//! Validates agent-written Markdown notes (`YYYY-MM-DD-slug.md` + YAML
//! frontmatter), renders them for the static-site generator, and publishes
//! them through the GitHub contents API with blob-SHA preconditions so that
//! concurrent writers never silently overwrite each other.

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod github_client;
pub mod payload;
pub mod routes;
pub mod submitter;
pub mod validate;

pub use error::{ApiError, ConfigError, PublishError, SubmitError, ValidationError};
pub use github_client::{CommitRef, ContentApi, GitHubContentsClient, RemoteFile};
pub use payload::{ContentPayload, build_payload};
pub use submitter::{NoteSubmitter, SubmitOutcome};
pub use validate::{Note, ValidNote, validate};
