//! In-memory vault for testing.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use obsidian_fs::{parse_frontmatter, parse_headings, Frontmatter, Heading};

use super::{LinkTarget, MetadataIndex, Note, NoteStore, Result, StoreError};

/// A vault held entirely in memory, populated with the builder methods.
#[derive(Debug, Default, Clone)]
pub struct InMemoryVault {
    files: BTreeMap<String, Vec<u8>>,
    paths: BTreeSet<String>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text note (builder style).
    pub fn with_note(mut self, path: &str, content: &str) -> Self {
        self.insert(path, content.as_bytes().to_vec());
        self
    }

    /// Add a binary file (builder style).
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.insert(path, content.to_vec());
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: &str, content: Vec<u8>) {
        let path = path.trim_matches('/').to_string();
        self.paths.insert(path.clone());
        self.files.insert(path, content);
    }
}

#[async_trait]
impl NoteStore for InMemoryVault {
    async fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path).await?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8(path.to_string()))
    }

    async fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path.trim_matches('/'))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn list_candidate_notes(&self) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        for (path, bytes) in &self.files {
            if !obsidian_fs::is_markdown(path) {
                continue;
            }
            let Ok(text) = std::str::from_utf8(bytes) else {
                continue;
            };
            let note = Note::new(
                path.clone(),
                parse_frontmatter(text).frontmatter.unwrap_or_default(),
            );
            if note.is_published() {
                notes.push(note);
            }
        }
        Ok(notes)
    }
}

#[async_trait]
impl MetadataIndex for InMemoryVault {
    async fn frontmatter(&self, path: &str) -> Result<Option<Frontmatter>> {
        let text = self.read_text(path).await?;
        Ok(parse_frontmatter(&text).frontmatter)
    }

    async fn headings(&self, path: &str) -> Result<Vec<Heading>> {
        let text = self.read_text(path).await?;
        Ok(parse_headings(&text))
    }

    async fn resolve_link(&self, link: &str, from_path: &str) -> Option<LinkTarget> {
        obsidian_fs::resolve_link_path(&self.paths, link, from_path).map(LinkTarget::from_path)
    }
}
