//! NoteSubmitter: validate, build and publish research notes.
//!
//! Writes use optimistic concurrency: every overwrite carries the blob SHA the
//! submitter last saw. A rejected precondition triggers one re-fetch; the write
//! is retried only if the remote still has the SHA we wrote against. A changed
//! SHA means another writer got there first, and that is reported as
//! `RemoteConflict` instead of being overwritten.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ApiError, PublishError, SubmitError};
use crate::github_client::{CommitRef, ContentApi};
use crate::payload::{ContentPayload, build_payload};
use crate::validate::{Note, ValidNote, validate};

/// Successful end-to-end submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub note: ValidNote,
    pub commit: CommitRef,
    pub published_url: Option<String>,
}

pub struct NoteSubmitter<A: ContentApi> {
    api: A,
    branch: String,
    site_url: Option<String>,
    submissions: AtomicU64,
    conflicts: AtomicU64,
}

impl<A: ContentApi> NoteSubmitter<A> {
    pub fn new(api: A, branch: &str) -> Self {
        Self {
            api,
            branch: branch.to_string(),
            site_url: None,
            submissions: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
        }
    }

    /// Base URL of the rendered site (builder pattern)
    pub fn with_site_url(mut self, site_url: &str) -> Self {
        self.site_url = Some(site_url.trim_end_matches('/').to_string());
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Successful writes since startup
    pub fn submission_count(&self) -> u64 {
        self.submissions.load(Ordering::Relaxed)
    }

    /// Writes rejected with `RemoteConflict` since startup
    pub fn conflict_count(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    /// Site URL a note will be rendered at (`/YYYY/MM/DD/slug.html`)
    pub fn published_url(&self, note: &ValidNote) -> Option<String> {
        self.site_url.as_ref().map(|base| {
            format!(
                "{}/{}/{}.html",
                base,
                note.date().format("%Y/%m/%d"),
                note.slug()
            )
        })
    }

    /// Validate and build a payload without touching the network
    pub fn preview(
        &self,
        note: &Note,
        existing_sha: Option<String>,
    ) -> Result<(ValidNote, ContentPayload), PublishError> {
        let valid = validate(note)?;
        let payload = build_payload(&valid, existing_sha);
        Ok((valid, payload))
    }

    /// Validate, look up the current blob SHA, and write the note.
    pub async fn submit(&self, note: &Note) -> Result<SubmitOutcome, PublishError> {
        let valid = validate(note)?;

        let existing = self
            .api
            .get_file(valid.filename(), &self.branch)
            .await
            .map_err(SubmitError::from)?;
        let payload = build_payload(&valid, existing.map(|f| f.sha));

        let commit = self.submit_payload(payload).await?;
        let published_url = self.published_url(&valid);

        Ok(SubmitOutcome {
            note: valid,
            commit,
            published_url,
        })
    }

    /// Write a prepared payload, using `payload.sha` as the precondition.
    pub async fn submit_payload(&self, payload: ContentPayload) -> Result<CommitRef, SubmitError> {
        let expected = payload.sha.clone();
        log::info!(
            "[NOTES] Writing {} on {} ({})",
            payload.path,
            self.branch,
            if expected.is_some() { "update" } else { "create" }
        );

        let request = payload.to_request(&self.branch, expected.as_deref());
        let first_err = match self.api.put_file(&payload.path, &request).await {
            Ok(commit) => return Ok(self.record_success(commit)),
            Err(ApiError::StaleSha { message, .. }) => message,
            Err(e) => {
                log::error!("[NOTES] Write of {} failed: {}", payload.path, e);
                return Err(e.into());
            }
        };

        log::warn!(
            "[NOTES] Write of {} rejected ({}), re-fetching blob SHA",
            payload.path,
            first_err
        );

        let current = self
            .api
            .get_file(&payload.path, &self.branch)
            .await?
            .map(|f| f.sha);

        if current != expected {
            return Err(self.conflict(&payload.path, expected, current));
        }

        match self.api.put_file(&payload.path, &request).await {
            Ok(commit) => Ok(self.record_success(commit)),
            Err(ApiError::StaleSha { .. }) => {
                let found = match self.api.get_file(&payload.path, &self.branch).await {
                    Ok(file) => file.map(|f| f.sha),
                    Err(e) => {
                        log::warn!(
                            "[NOTES] Could not re-fetch {} after second rejection, remote SHA unknown: {}",
                            payload.path,
                            e
                        );
                        None
                    }
                };
                Err(self.conflict(&payload.path, expected, found))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn record_success(&self, commit: CommitRef) -> CommitRef {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "[NOTES] {} {} in commit {}",
            if commit.created { "Created" } else { "Updated" },
            commit.path,
            commit.commit_sha
        );
        commit
    }

    fn conflict(&self, path: &str, expected: Option<String>, found: Option<String>) -> SubmitError {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
        log::warn!(
            "[NOTES] Conflicting write to {}: expected {:?}, remote has {:?}",
            path,
            expected,
            found
        );
        SubmitError::RemoteConflict {
            path: path.to_string(),
            expected,
            found,
        }
    }
}
