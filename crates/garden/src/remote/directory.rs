//! Remote repository backed by a plain directory (for example a site checkout).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use obsidian_fs::validate_relative_path;
use tokio::fs;
use tokio::sync::Mutex;

use super::{Manifest, RemoteError, RemoteRepository, Result};
use crate::fingerprint::Fingerprint;

/// Published files stored beneath `root`.
///
/// A file's revision is its git blob fingerprint, so revisions read from the
/// manifest and from `current_revision` agree.
pub struct DirectoryRemote {
    root: PathBuf,
    /// Serializes check-then-write so a conditional write cannot interleave.
    write_lock: Mutex<()>,
}

impl DirectoryRemote {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let clean = validate_relative_path(path).map_err(|e| RemoteError::InvalidPath {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.root.join(clean))
    }

    async fn revision_of(&self, full_path: &Path) -> Result<Option<String>> {
        match fs::read(full_path).await {
            Ok(bytes) => Ok(Some(Fingerprint::of(&bytes).as_str().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e)),
        }
    }

    async fn collect(&self, dir: &Path, manifest: &mut Manifest) -> Result<()> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_error(e)),
        };

        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type().await.map_err(io_error)?;
            if file_type.is_dir() {
                Box::pin(self.collect(&path, manifest)).await?;
            } else if file_type.is_file() {
                let Some(relative) = relative_path(&self.root, &path) else {
                    continue;
                };
                let bytes = fs::read(&path).await.map_err(io_error)?;
                manifest.insert(relative, Fingerprint::of(&bytes).as_str().to_string());
            }
        }

        Ok(())
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn io_error(e: std::io::Error) -> RemoteError {
    RemoteError::Io(e.to_string())
}

fn check_revision(path: &str, expected: Option<&str>, actual: Option<String>) -> Result<()> {
    if expected == actual.as_deref() {
        return Ok(());
    }
    Err(RemoteError::Conflict {
        path: path.to_string(),
        expected: expected.map(str::to_string),
        actual,
    })
}

#[async_trait]
impl RemoteRepository for DirectoryRemote {
    async fn manifest(&self) -> Result<Manifest> {
        let mut manifest = Manifest::new();
        self.collect(&self.root, &mut manifest).await?;
        tracing::debug!("Remote manifest has {} entries", manifest.len());
        Ok(manifest)
    }

    async fn current_revision(&self, path: &str) -> Result<Option<String>> {
        let full_path = self.full_path(path)?;
        self.revision_of(&full_path).await
    }

    async fn put(&self, path: &str, content: &str, revision: Option<&str>, message: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        let _guard = self.write_lock.lock().await;

        let actual = self.revision_of(&full_path).await?;
        check_revision(path, revision, actual)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        fs::write(&full_path, content).await.map_err(io_error)?;

        tracing::debug!("{}", message);
        Ok(())
    }

    async fn delete(&self, path: &str, revision: &str, message: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        let _guard = self.write_lock.lock().await;

        let actual = self
            .revision_of(&full_path)
            .await?
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))?;
        check_revision(path, Some(revision), Some(actual))?;

        fs::remove_file(&full_path).await.map_err(io_error)?;

        tracing::debug!("{}", message);
        Ok(())
    }
}
