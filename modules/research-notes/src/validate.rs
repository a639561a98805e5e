//! Note validation: filename, slug, date agreement and title.
//!
//! A `ValidNote` can only be obtained through [`validate`], so everything
//! downstream (payload building, submission) can rely on a well-formed
//! filename and normalized metadata.

use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::error::ValidationError;
use crate::frontmatter;

/// Slugs too generic to identify a note
pub const RESERVED_SLUGS: &[&str] = &[
    "notes",
    "note",
    "untitled",
    "research",
    "research-notes",
    "draft",
    "new-note",
    "index",
    "post",
];

pub const MAX_SLUG_LEN: usize = 100;

static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)\.md$").unwrap());
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());
/// Bare date, or a timestamp with optional seconds, fraction and UTC offset.
/// Anything else could not be written unquoted into the frontmatter.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?: ?(?:Z|[+-]\d{2}:?\d{2}))?)?$",
    )
    .unwrap()
});

/// A proposed note, as submitted by an agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    pub filename: String,
    pub title: String,
    /// Raw frontmatter date (`YYYY-MM-DD` or an ISO-style timestamp starting with it)
    pub date: String,
    pub tags: Vec<String>,
    pub body: String,
}

impl Note {
    /// Build a note from a complete document (YAML frontmatter + Markdown body)
    pub fn from_markdown(filename: impl Into<String>, document: &str) -> Self {
        let parsed = frontmatter::parse_document(document);
        Self {
            filename: filename.into(),
            title: parsed.frontmatter.title,
            date: parsed.frontmatter.date.unwrap_or_default(),
            tags: parsed.frontmatter.tags,
            body: parsed.body,
        }
    }
}

/// A note that passed validation, with normalized metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidNote {
    filename: String,
    slug: String,
    date: NaiveDate,
    raw_date: String,
    title: String,
    tags: Vec<String>,
    body: String,
}

impl ValidNote {
    /// Target path in the remote repository (the filename itself)
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Date exactly as it will be written to the frontmatter
    pub fn frontmatter_date(&self) -> &str {
        &self.raw_date
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lowercase, deduplicated, sorted
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Full document text: frontmatter followed by the body
    pub fn render(&self) -> String {
        frontmatter::render_document(&self.title, &self.raw_date, &self.tags, &self.body)
    }
}

/// Validate a proposed note.
///
/// Checks run in order (filename, slug, date, title) and the first failure is
/// returned.
pub fn validate(note: &Note) -> Result<ValidNote, ValidationError> {
    let (filename_date, slug) = check_filename(&note.filename)?;
    check_slug(slug)?;
    let raw_date = check_date(filename_date, &note.date)?;

    let title = normalize_title(&note.title);
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    Ok(ValidNote {
        filename: note.filename.clone(),
        slug: slug.to_string(),
        date: filename_date,
        raw_date,
        title,
        tags: normalize_tags(&note.tags),
        body: note.body.clone(),
    })
}

fn check_filename(filename: &str) -> Result<(NaiveDate, &str), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFilename {
        filename: filename.to_string(),
        reason: reason.to_string(),
    };

    if filename.contains('/') || filename.contains('\\') {
        return Err(invalid("must be a bare filename, not a path"));
    }

    let caps = FILENAME_RE
        .captures(filename)
        .ok_or_else(|| invalid("expected YYYY-MM-DD-slug.md"))?;

    let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d")
        .map_err(|_| invalid("date prefix is not a valid calendar date"))?;

    let slug = caps.get(2).map_or("", |m| m.as_str());
    Ok((date, slug))
}

fn check_slug(slug: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidSlug {
        slug: slug.to_string(),
        reason: reason.to_string(),
    };

    if !SLUG_RE.is_match(slug) {
        return Err(invalid(
            "only lowercase ASCII letters, digits and single hyphens are allowed",
        ));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(invalid("slug is too long"));
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Err(invalid("slug is too generic"));
    }
    Ok(())
}

/// Returns the trimmed raw frontmatter date when it agrees with the filename
fn check_date(filename_date: NaiveDate, raw: &str) -> Result<String, ValidationError> {
    let raw = raw.trim();
    let mismatch = || ValidationError::DateMismatch {
        filename_date: filename_date.format("%Y-%m-%d").to_string(),
        frontmatter_date: raw.to_string(),
    };

    if !DATE_RE.is_match(raw) {
        return Err(mismatch());
    }

    let date = NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d").map_err(|_| mismatch())?;
    if date != filename_date {
        return Err(mismatch());
    }
    Ok(raw.to_string())
}

fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase, collapse inner whitespace to hyphens, drop characters that would
/// break an inline YAML list, deduplicate and sort.
///
/// A tag must start with a letter, digit or `_`: a leading `-` is read as a
/// block sequence entry inside `[...]`. Tags with nothing alphanumeric left are
/// dropped.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| {
            tag.to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
                .chars()
                .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '+'))
                .collect::<String>()
                .trim_start_matches(['-', '.', '+'])
                .to_string()
        })
        .filter(|tag| tag.chars().any(char::is_alphanumeric))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Slugify a title (e.g. "AWS Lambda: Best Practices!" -> "aws-lambda-best-practices")
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .join("-")
}

/// Suggest a `YYYY-MM-DD-slug.md` filename for a title
fn suggest_filename(date: NaiveDate, title: &str) -> String {
    let mut slug = slugify(title);
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }
    format!("{}-{}.md", date.format("%Y-%m-%d"), slug)
}

/// A filename that would pass validation for a note rejected over its
/// filename or slug, derived from the note's date and title.
pub fn filename_hint(note: &Note, err: &ValidationError) -> Option<String> {
    if !matches!(
        err,
        ValidationError::InvalidFilename { .. } | ValidationError::InvalidSlug { .. }
    ) {
        return None;
    }

    let date = NaiveDate::parse_from_str(note.date.trim().get(..10)?, "%Y-%m-%d").ok()?;
    let candidate = Note {
        filename: suggest_filename(date, &note.title),
        ..note.clone()
    };
    validate(&candidate).ok().map(|_| candidate.filename)
}
