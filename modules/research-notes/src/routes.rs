//! Axum route handlers for the research-notes module RPC API.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use research_notes_types::*;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{PublishError, SubmitError};
use crate::github_client::GitHubContentsClient;
use crate::submitter::NoteSubmitter;
use crate::validate::{Note, filename_hint, validate};

pub struct AppState {
    pub submitter: NoteSubmitter<GitHubContentsClient>,
    pub repository: String,
    pub start_time: Instant,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rpc/validate", post(validate_note))
        .route("/rpc/submit", post(submit_note))
        .route("/rpc/status", get(status))
        .with_state(state)
}

fn note_from_request(req: SubmitNoteRequest) -> Note {
    match req.markdown {
        Some(markdown) => Note::from_markdown(req.filename, &markdown),
        None => Note {
            filename: req.filename,
            title: req.title.unwrap_or_default(),
            date: req.date.unwrap_or_default(),
            tags: req.tags,
            body: req.body.unwrap_or_default(),
        },
    }
}

fn error_status(err: &PublishError) -> StatusCode {
    match err {
        PublishError::Validation(_) => StatusCode::BAD_REQUEST,
        PublishError::Submit(SubmitError::RemoteConflict { .. }) => StatusCode::CONFLICT,
        PublishError::Submit(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Error text for the caller, with a filename suggestion when the filename or
/// slug was rejected
fn error_message(note: &Note, err: &PublishError) -> String {
    let hint = match err {
        PublishError::Validation(v) => filename_hint(note, v),
        PublishError::Submit(_) => None,
    };
    match hint {
        Some(filename) => format!("{} (suggested filename: {})", err, filename),
        None => err.to_string(),
    }
}

// POST /rpc/validate
pub async fn validate_note(
    Json(req): Json<SubmitNoteRequest>,
) -> (StatusCode, Json<RpcResponse<ValidatedNote>>) {
    let note = note_from_request(req);
    match validate(&note) {
        Ok(valid) => {
            let result = ValidatedNote {
                path: valid.filename().to_string(),
                slug: valid.slug().to_string(),
                date: valid.date().format("%Y-%m-%d").to_string(),
                title: valid.title().to_string(),
                tags: valid.tags().to_vec(),
                document: valid.render(),
            };
            (StatusCode::OK, Json(RpcResponse::ok(result)))
        }
        Err(e) => {
            let message = error_message(&note, &PublishError::from(e));
            (StatusCode::BAD_REQUEST, Json(RpcResponse::err(message)))
        }
    }
}

// POST /rpc/submit
pub async fn submit_note(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitNoteRequest>,
) -> (StatusCode, Json<RpcResponse<SubmitResult>>) {
    let note = note_from_request(req);

    match state.submitter.submit(&note).await {
        Ok(outcome) => {
            let result = SubmitResult {
                path: outcome.commit.path,
                created: outcome.commit.created,
                commit_sha: outcome.commit.commit_sha,
                content_sha: outcome.commit.content_sha,
                commit_url: outcome.commit.commit_url,
                published_url: outcome.published_url,
            };
            (StatusCode::OK, Json(RpcResponse::ok(result)))
        }
        Err(e) => {
            log::warn!("[NOTES] Rejected {}: {}", note.filename, e);
            (error_status(&e), Json(RpcResponse::err(error_message(&note, &e))))
        }
    }
}

// GET /rpc/status
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    let status = ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        repository: state.repository.clone(),
        branch: state.submitter.branch().to_string(),
        total_submissions: state.submitter.submission_count(),
        total_conflicts: state.submitter.conflict_count(),
    };

    (StatusCode::OK, Json(RpcResponse::ok(status)))
}
