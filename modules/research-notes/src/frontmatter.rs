//! Parse and generate YAML frontmatter for research notes.
//!
//! Hand-rolled YAML (no serde_yaml). The generated block is the only shape the
//! static-site renderer needs: a quoted title, a date and an inline tag list.
//! Rendering never touches the body, so `parse_document(render_document(..))`
//! returns the body byte-for-byte.

const DELIMITER: &str = "---";

/// Parsed note frontmatter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFrontmatter {
    pub title: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
}

/// A fully parsed note document (frontmatter + body)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub frontmatter: NoteFrontmatter,
    pub body: String,
}

/// Render a complete document: frontmatter block followed by the untouched body.
pub fn render_document(title: &str, date: &str, tags: &[String], body: &str) -> String {
    let mut out = generate_frontmatter(title, date, tags);
    out.push('\n');
    out.push_str(body);
    out
}

/// Generate the YAML frontmatter block (without trailing newline)
pub fn generate_frontmatter(title: &str, date: &str, tags: &[String]) -> String {
    let lines = [
        DELIMITER.to_string(),
        format!("title: \"{}\"", escape_double_quoted(title)),
        format!("date: {}", date),
        format!("tags: [{}]", tags.join(", ")),
        DELIMITER.to_string(),
    ];
    lines.join("\n")
}

/// Split a document into frontmatter and body.
///
/// Documents without a leading `---` line are all body. The body starts right
/// after the newline that ends the closing delimiter.
pub fn parse_document(content: &str) -> ParsedDocument {
    let Some((yaml, body)) = split_frontmatter(content) else {
        return ParsedDocument {
            frontmatter: NoteFrontmatter::default(),
            body: content.to_string(),
        };
    };

    ParsedDocument {
        frontmatter: parse_frontmatter(yaml),
        body: body.to_string(),
    }
}

fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            let yaml = &rest[..offset - line.len()];
            return Some((yaml, &rest[offset..]));
        }
    }
    None
}

fn parse_frontmatter(yaml: &str) -> NoteFrontmatter {
    let mut fm = NoteFrontmatter::default();

    let mut lines = yaml.lines().peekable();
    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = trimmed.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "title" => fm.title = unquote(value),
                "date" => fm.date = Some(unquote(value)),
                "tags" => {
                    if value.starts_with('[') {
                        fm.tags = parse_inline_list(value);
                    } else if !value.is_empty() {
                        fm.tags = vec![unquote(value)];
                    } else {
                        // Block list: "tags:" followed by "- item" lines
                        fm.tags.clear();
                        while let Some(item) = lines.peek().and_then(|l| block_item(l)) {
                            lines.next();
                            if !item.is_empty() {
                                fm.tags.push(item);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fm
}

fn escape_double_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Remove surrounding quotes, undoing the escapes `generate_frontmatter` applies
fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        let inner = &s[1..s.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        out
    } else if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        s[1..s.len() - 1].replace("''", "'")
    } else {
        s.to_string()
    }
}

/// Parse an inline YAML list like [foo, bar, "baz qux"]
fn parse_inline_list(s: &str) -> Vec<String> {
    let s = s.trim();
    let inner = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(s);

    inner
        .split(',')
        .map(|item| unquote(item.trim()))
        .filter(|item| !item.is_empty())
        .collect()
}

fn block_item(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed == "-" {
        return Some(String::new());
    }
    trimmed.strip_prefix("- ").map(unquote)
}
