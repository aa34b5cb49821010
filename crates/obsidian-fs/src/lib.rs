//! Path resolution, frontmatter and heading utilities for Obsidian vaults
//!
//! These are pure functions with no I/O: vault implementations read the files
//! and hand the text (or the list of known paths) to this crate.

mod frontmatter;
mod headings;

pub use frontmatter::{
    parse_frontmatter, render_frontmatter, split_frontmatter, strip_frontmatter, Frontmatter,
    ParsedNote,
};
pub use headings::{parse_headings, Heading};

use std::collections::BTreeSet;

/// Extension of Markdown notes, without the dot
pub const MARKDOWN_EXTENSION: &str = "md";

/// Suffix marking an Excalidraw drawing stored as a Markdown note
pub const DRAWING_SUFFIX: &str = ".excalidraw.md";

/// Returns the extension of the last path segment, without the dot.
pub fn extension(path: &str) -> Option<&str> {
    let file_name = file_name(path);
    match file_name.rfind('.') {
        Some(dot_pos) if dot_pos > 0 => Some(&file_name[dot_pos + 1..]),
        _ => None,
    }
}

/// Returns the last path segment: "folder/Note.md" -> "Note.md"
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns the path with the extension of its last segment removed.
pub fn strip_extension(path: &str) -> &str {
    match extension(path) {
        Some(ext) => &path[..path.len() - ext.len() - 1],
        None => path,
    }
}

/// Returns the file name without its extension: "folder/Draw.excalidraw.md" -> "Draw.excalidraw"
pub fn basename(path: &str) -> &str {
    strip_extension(file_name(path))
}

/// Whether the path names a Markdown note.
pub fn is_markdown(path: &str) -> bool {
    extension(path) == Some(MARKDOWN_EXTENSION)
}

/// Whether the path names an Excalidraw drawing note.
pub fn is_drawing(path: &str) -> bool {
    path.ends_with(DRAWING_SUFFIX)
}

/// Derive a URL path from a vault path: each folder and the file stem are
/// slugified, the extension is dropped and a trailing `/` is appended.
///
/// "Daily Notes/My Day.md" -> "daily-notes/my-day/"
pub fn generate_url_path(path: &str) -> String {
    let without_extension = strip_extension(path);
    let segments: Vec<String> = without_extension
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(slug::slugify)
        .collect();
    format!("{}/", segments.join("/"))
}

/// Convert a camelCase identifier to kebab-case: "dgShowBacklinks" -> "dg-show-backlinks"
pub fn kebabize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if idx != 0 {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Resolve a link path the way Obsidian picks the first link destination.
///
/// Tried in order, for the link as written and with `.md` appended (the
/// appended form first when the link has no extension):
/// 1. an exact vault path,
/// 2. a path relative to the folder of `from_path`,
/// 3. any path whose trailing segments equal the link; the shortest wins.
pub fn resolve_link_path(files: &BTreeSet<String>, link: &str, from_path: &str) -> Option<String> {
    let link = link.trim().trim_start_matches('/');
    if link.is_empty() {
        return None;
    }

    let with_md = ensure_markdown_extension(link);
    let candidates: Vec<&str> = if extension(link).is_some() {
        vec![link, with_md.as_str()]
    } else {
        vec![with_md.as_str(), link]
    };

    for candidate in &candidates {
        if files.contains(*candidate) {
            return Some(candidate.to_string());
        }
        if let Some(relative) = join_relative(from_path, candidate) {
            if files.contains(&relative) {
                return Some(relative);
            }
        }
    }

    for candidate in &candidates {
        let suffix = format!("/{}", candidate);
        let best = files
            .iter()
            .filter(|path| path.ends_with(&suffix))
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        if let Some(path) = best {
            return Some(path.clone());
        }
    }

    None
}

/// Join a link onto the folder of `from_path`, collapsing `.` and `..` segments.
fn join_relative(from_path: &str, link: &str) -> Option<String> {
    let mut segments: Vec<&str> = from_path.split('/').collect();
    segments.pop();

    for part in link.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.join("/"))
}

/// Validate that a relative path is safe (no directory traversal)
pub fn validate_relative_path(path: &str) -> Result<String, PathValidationError> {
    let clean_path = path.strip_prefix('/').unwrap_or(path);

    if clean_path.split('/').any(|segment| segment == "..") {
        return Err(PathValidationError::DirectoryTraversal);
    }

    if clean_path.starts_with('/') {
        return Err(PathValidationError::AbsolutePath);
    }

    Ok(clean_path.to_string())
}

/// Ensure .md extension on note paths
pub fn ensure_markdown_extension(note_path: &str) -> String {
    if note_path.ends_with(".md") {
        note_path.to_string()
    } else {
        format!("{}.md", note_path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathValidationError {
    DirectoryTraversal,
    AbsolutePath,
}

impl std::fmt::Display for PathValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathValidationError::DirectoryTraversal => {
                write!(f, "Path contains directory traversal")
            }
            PathValidationError::AbsolutePath => write!(f, "Path is absolute"),
        }
    }
}

impl std::error::Error for PathValidationError {}
