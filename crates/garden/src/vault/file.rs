//! Filesystem vault using tokio::fs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use obsidian_fs::{parse_frontmatter, parse_headings, validate_relative_path, Frontmatter, Heading};
use tokio::fs;

use super::{LinkTarget, MetadataIndex, Note, NoteStore, Result, StoreError};

/// A vault directory on disk.
///
/// The file list is captured when the vault is opened; content and metadata
/// are read on demand.
pub struct FileVault {
    root: PathBuf,
    files: BTreeSet<String>,
}

impl FileVault {
    /// Scan the vault and record every file path.
    pub async fn open(root: PathBuf) -> Result<Self> {
        tracing::info!("Scanning vault at {}", root.display());

        let mut files = BTreeSet::new();
        Self::collect_files(&root, &root, &mut files).await?;

        tracing::info!("Found {} files", files.len());
        Ok(Self { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Vault-relative paths of every file.
    pub fn files(&self) -> &BTreeSet<String> {
        &self.files
    }

    /// Recursively collect files, skipping hidden entries (.obsidian, .git, .trash, etc.)
    async fn collect_files(root: &Path, dir: &Path, files: &mut BTreeSet<String>) -> Result<()> {
        let mut entries = fs::read_dir(dir).await.map_err(io_error)?;

        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            let file_name = entry.file_name();
            if file_name.to_string_lossy().starts_with('.') {
                continue;
            }

            let file_type = entry.file_type().await.map_err(io_error)?;
            if file_type.is_dir() {
                Box::pin(Self::collect_files(root, &path, files)).await?;
            } else if file_type.is_file() {
                if let Some(relative) = relative_path(root, &path) {
                    files.insert(relative);
                }
            }
        }

        Ok(())
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let clean = validate_relative_path(path).map_err(|e| StoreError::InvalidPath {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.root.join(clean))
    }
}

/// Vault-relative path with `/` separators on every platform.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn io_error(e: std::io::Error) -> StoreError {
    StoreError::Io(e.to_string())
}

#[async_trait]
impl NoteStore for FileVault {
    async fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path).await?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8(path.to_string()))
    }

    async fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(path)?;
        fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_string())
            } else {
                io_error(e)
            }
        })
    }

    async fn list_candidate_notes(&self) -> Result<Vec<Note>> {
        let mut notes = Vec::new();

        for path in self.files.iter().filter(|p| obsidian_fs::is_markdown(p)) {
            let text = match self.read_text(path).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path, e);
                    continue;
                }
            };

            let frontmatter = parse_frontmatter(&text).frontmatter.unwrap_or_default();
            let note = Note::new(path.clone(), frontmatter);
            if note.is_published() {
                notes.push(note);
            }
        }

        tracing::debug!("{} notes marked for publishing", notes.len());
        Ok(notes)
    }
}

#[async_trait]
impl MetadataIndex for FileVault {
    async fn frontmatter(&self, path: &str) -> Result<Option<Frontmatter>> {
        let text = self.read_text(path).await?;
        Ok(parse_frontmatter(&text).frontmatter)
    }

    async fn headings(&self, path: &str) -> Result<Vec<Heading>> {
        let text = self.read_text(path).await?;
        Ok(parse_headings(&text))
    }

    async fn resolve_link(&self, link: &str, from_path: &str) -> Option<LinkTarget> {
        obsidian_fs::resolve_link_path(&self.files, link, from_path).map(LinkTarget::from_path)
    }
}
