//! Writes assembled notes to the remote and removes orphaned ones.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::assembler::Assembler;
use crate::remote::{remote_path, RemoteRepository};
use crate::settings::RemoteIdentity;
use crate::vault::Note;

pub struct Publisher {
    remote: Arc<dyn RemoteRepository>,
    assembler: Arc<Assembler>,
    identity: RemoteIdentity,
}

/// Outcome of one item in a batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub path: String,
    pub ok: bool,
}

impl Publisher {
    /// The identity is obtained from `PublishSettings::remote_identity`, which
    /// fails with a `ConfigError` before any remote call can be made.
    pub fn new(remote: Arc<dyn RemoteRepository>, assembler: Arc<Assembler>, identity: RemoteIdentity) -> Self {
        Self {
            remote,
            assembler,
            identity,
        }
    }

    /// Assemble `note` and create or update its remote copy.
    pub async fn publish(&self, note: &Note) -> bool {
        if !validate_publish_frontmatter(note) {
            return false;
        }

        let content = match self.assembler.assemble(note).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Not publishing {}: {}", note.path, e);
                return false;
            }
        };

        let path = remote_path(&note.path, note.is_home(), note.kind());
        let revision = match self.remote.current_revision(&path).await {
            Ok(revision) => revision,
            Err(e) => {
                tracing::warn!("Failed to read revision of {}: {}", path, e);
                return false;
            }
        };

        let message = match revision {
            Some(_) => format!("Update note {}", note.path),
            None => format!("Add note {}", note.path),
        };

        match self.remote.put(&path, &content, revision.as_deref(), &message).await {
            Ok(()) => {
                tracing::info!("{} -> {}/{}:{}", message, self.identity.owner, self.identity.repo, path);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to publish {}: {}", note.path, e);
                false
            }
        }
    }

    /// Delete the remote file at `remote_path`. False when it does not exist.
    pub async fn delete(&self, remote_path: &str) -> bool {
        let revision = match self.remote.current_revision(remote_path).await {
            Ok(Some(revision)) => revision,
            Ok(None) => {
                tracing::warn!("Nothing to delete at {}", remote_path);
                return false;
            }
            Err(e) => {
                tracing::warn!("Failed to read revision of {}: {}", remote_path, e);
                return false;
            }
        };

        let message = format!("Delete note {}", remote_path);
        match self.remote.delete(remote_path, &revision, &message).await {
            Ok(()) => {
                tracing::info!("{} from {}/{}", message, self.identity.owner, self.identity.repo);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to delete {}: {}", remote_path, e);
                false
            }
        }
    }

    /// Delete the published copy of a vault note.
    pub async fn delete_note(&self, note: &Note) -> bool {
        self.delete(&remote_path(&note.path, note.is_home(), note.kind())).await
    }

    pub async fn publish_all(&self, notes: &[Note]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(notes.len());
        for note in notes {
            outcomes.push(BatchOutcome {
                path: note.path.clone(),
                ok: self.publish(note).await,
            });
        }
        outcomes
    }

    pub async fn delete_all(&self, remote_paths: &[String]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(remote_paths.len());
        for path in remote_paths {
            outcomes.push(BatchOutcome {
                path: path.clone(),
                ok: self.delete(path).await,
            });
        }
        outcomes
    }
}

/// A note may be published when it is flagged `dg-publish: true` and any
/// `dg-permalink` it sets is a string.
pub fn validate_publish_frontmatter(note: &Note) -> bool {
    if !note.is_published() {
        tracing::warn!("{} is not marked dg-publish: true", note.path);
        return false;
    }
    if let Some(permalink) = note.frontmatter.get("dg-permalink") {
        if !matches!(permalink, JsonValue::String(_)) {
            tracing::warn!("{} has a dg-permalink that is not a string", note.path);
            return false;
        }
    }
    true
}
