//! Note store and metadata index collaborators.
//!
//! Implementations:
//! - `FileVault` - Reads a vault directory with tokio::fs
//! - `InMemoryVault` - For testing

mod file;
mod memory;

pub use file::FileVault;
pub use memory::InMemoryVault;

use async_trait::async_trait;
use obsidian_fs::{Frontmatter, Heading};
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use wiki_links::WikiLink;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// How a note is rendered for publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    Markdown,
    Drawing,
}

/// A vault note as seen by the publisher. Owned by the store; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    /// Vault-relative path: "notes/My Note.md"
    pub path: String,
    /// Parsed frontmatter (empty when the note has none)
    pub frontmatter: Frontmatter,
}

impl Note {
    pub fn new(path: impl Into<String>, frontmatter: Frontmatter) -> Self {
        Self {
            path: path.into(),
            frontmatter,
        }
    }

    /// Whether the note is flagged `dg-home: true`.
    pub fn is_home(&self) -> bool {
        flag(&self.frontmatter, "dg-home")
    }

    /// Whether the note is flagged `dg-publish: true`.
    pub fn is_published(&self) -> bool {
        flag(&self.frontmatter, "dg-publish")
    }

    /// File name without extension.
    pub fn basename(&self) -> &str {
        obsidian_fs::basename(&self.path)
    }

    pub fn kind(&self) -> DocumentKind {
        if obsidian_fs::is_drawing(&self.path) {
            DocumentKind::Drawing
        } else {
            DocumentKind::Markdown
        }
    }
}

fn flag(frontmatter: &Frontmatter, key: &str) -> bool {
    frontmatter.get(key) == Some(&JsonValue::Bool(true))
}

/// Where a link points after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A Markdown note (including drawings)
    Document(String),
    /// Any other vault file: images, PDFs, SVGs
    Resource(String),
}

impl LinkTarget {
    fn from_path(path: String) -> Self {
        if obsidian_fs::is_markdown(&path) {
            LinkTarget::Document(path)
        } else {
            LinkTarget::Resource(path)
        }
    }

    pub fn path(&self) -> &str {
        match self {
            LinkTarget::Document(path) | LinkTarget::Resource(path) => path,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, LinkTarget::Document(path) if obsidian_fs::is_drawing(path))
    }
}

/// Read access to note content.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Read a file as UTF-8 text
    async fn read_text(&self, path: &str) -> Result<String>;

    /// Read a file as raw bytes
    async fn read_binary(&self, path: &str) -> Result<Vec<u8>>;

    /// Notes whose frontmatter has `dg-publish: true`
    async fn list_candidate_notes(&self) -> Result<Vec<Note>>;
}

/// Parsed metadata and link resolution.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Frontmatter of a note, None when it has none
    async fn frontmatter(&self, path: &str) -> Result<Option<Frontmatter>>;

    /// Headings of a note in document order
    async fn headings(&self, path: &str) -> Result<Vec<Heading>>;

    /// Resolve a link path ("folder/Note", "pic.png") as seen from `from_path`
    async fn resolve_link(&self, link: &str, from_path: &str) -> Option<LinkTarget>;
}

/// Resolve a parsed wiki link (its path, ignoring fragment and alias).
pub async fn resolve_wiki_link(
    index: &dyn MetadataIndex,
    link: &WikiLink,
    from_path: &str,
) -> Option<LinkTarget> {
    index.resolve_link(&link.path(), from_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn note(path: &str, fm: JsonValue) -> Note {
        Note::new(path, fm.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn flags_require_boolean_true() {
        assert!(note("a.md", json!({"dg-publish": true})).is_published());
        assert!(!note("a.md", json!({"dg-publish": "true"})).is_published());
        assert!(note("a.md", json!({"dg-home": true})).is_home());
        assert!(!note("a.md", json!({})).is_home());
    }

    #[test]
    fn kind_and_basename() {
        let drawing = note("art/Sketch.excalidraw.md", json!({}));
        assert_eq!(drawing.kind(), DocumentKind::Drawing);
        assert_eq!(drawing.basename(), "Sketch.excalidraw");

        let plain = note("notes/Plain.md", json!({}));
        assert_eq!(plain.kind(), DocumentKind::Markdown);
        assert_eq!(plain.basename(), "Plain");
    }

    #[test]
    fn link_targets() {
        assert!(LinkTarget::from_path("a/Draw.excalidraw.md".into()).is_drawing());
        assert_eq!(
            LinkTarget::from_path("pic.png".into()),
            LinkTarget::Resource("pic.png".into())
        );
        assert_eq!(LinkTarget::from_path("n.md".into()).path(), "n.md");
    }
}
