//! Contents API payload construction.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::validate::ValidNote;

/// Everything needed for one create-or-update write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPayload {
    /// Repository path (equal to the note filename)
    pub path: String,
    /// Rendered document: frontmatter block followed by the Markdown body
    pub text: String,
    /// `text` as base64, ready for the API
    pub content: String,
    pub message: String,
    /// Current blob SHA when the path already exists
    pub sha: Option<String>,
}

impl ContentPayload {
    pub fn is_update(&self) -> bool {
        self.sha.is_some()
    }

    /// Request body for a write against `branch`, using `sha` as precondition
    pub fn to_request(&self, branch: &str, sha: Option<&str>) -> PutFileRequest {
        PutFileRequest {
            message: self.message.clone(),
            content: self.content.clone(),
            branch: branch.to_string(),
            sha: sha.map(str::to_string),
        }
    }
}

/// JSON body of the contents API `PUT`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutFileRequest {
    pub message: String,
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Build the payload for a validated note.
///
/// `existing_sha` is the blob SHA of the file currently at the note's path,
/// or `None` if the path does not exist yet. It selects the commit message and
/// becomes the write precondition.
pub fn build_payload(note: &ValidNote, existing_sha: Option<String>) -> ContentPayload {
    let text = note.render();
    let content = STANDARD.encode(text.as_bytes());
    let verb = if existing_sha.is_some() { "Update" } else { "Add" };

    ContentPayload {
        path: note.filename().to_string(),
        content,
        text,
        message: format!("{} research note: {}", verb, note.title()),
        sha: existing_sha,
    }
}

/// Decode a base64 `content` field back to text.
///
/// The API returns content wrapped at 60 columns, so embedded newlines are
/// ignored.
pub fn decode_content(content: &str) -> Result<String, String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| format!("Invalid base64 content: {}", e))?;
    String::from_utf8(bytes).map_err(|e| format!("Content is not UTF-8: {}", e))
}
