//! Remote content repository the garden is published to.
//!
//! Implementations:
//! - `DirectoryRemote` - Published files kept in a local directory

mod directory;

pub use directory::DirectoryRemote;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::vault::DocumentKind;

/// Site folder holding every published note except the home note.
pub const NOTES_ROOT: &str = "src/site/notes";

/// Remote path of the home note.
pub const HOME_PATH: &str = "src/site/index.md";

/// Remote path → fingerprint hex of every published file.
pub type Manifest = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote file not found: {0}")]
    NotFound(String),

    #[error("Revision conflict on {path}: expected {expected:?}, found {actual:?}")]
    Conflict {
        path: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("Invalid remote path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

/// Hash-addressed remote storage with optimistic concurrency.
///
/// Writes carry the revision the caller last saw; a write against a stale
/// revision fails with `RemoteError::Conflict`.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Every published file and its fingerprint
    async fn manifest(&self) -> Result<Manifest>;

    /// Current revision of a file, None when it does not exist
    async fn current_revision(&self, path: &str) -> Result<Option<String>>;

    /// Create (revision None) or replace (current revision) a file
    async fn put(&self, path: &str, content: &str, revision: Option<&str>, message: &str) -> Result<()>;

    /// Delete a file at its current revision
    async fn delete(&self, path: &str, revision: &str, message: &str) -> Result<()>;
}

/// Map a vault path to where it is published.
///
/// The home note always lands on the site index. Drawings drop their
/// `.excalidraw` infix so the site serves them as plain notes.
pub fn remote_path(local_path: &str, is_home: bool, kind: DocumentKind) -> String {
    if is_home {
        return HOME_PATH.to_string();
    }

    let local_path = local_path.trim_start_matches('/');
    match kind {
        DocumentKind::Drawing => {
            let stem = local_path
                .strip_suffix(obsidian_fs::DRAWING_SUFFIX)
                .unwrap_or(local_path);
            format!("{}/{}.md", NOTES_ROOT, stem.trim_end_matches(".md"))
        }
        DocumentKind::Markdown => format!("{}/{}", NOTES_ROOT, local_path),
    }
}
