//! Classifies candidate notes against what the remote already serves.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::assembler::Assembler;
use crate::fingerprint::Fingerprint;
use crate::remote::{remote_path, Manifest, RemoteError, RemoteRepository};
use crate::vault::{Note, NoteStore, StoreError};

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Failed to list notes: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to fetch remote manifest: {0}")]
    Remote(#[from] RemoteError),
}

/// Every candidate note in exactly one of the first three lists, plus the
/// remote files no candidate accounts for. All lists are sorted by path.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PublishStatus {
    pub unpublished_notes: Vec<Note>,
    pub published_notes: Vec<Note>,
    pub changed_notes: Vec<Note>,
    pub deleted_remote_paths: Vec<String>,
}

pub struct PublishStatusManager {
    store: Arc<dyn NoteStore>,
    remote: Arc<dyn RemoteRepository>,
    assembler: Arc<Assembler>,
}

impl PublishStatusManager {
    pub fn new(store: Arc<dyn NoteStore>, remote: Arc<dyn RemoteRepository>, assembler: Arc<Assembler>) -> Self {
        Self {
            store,
            remote,
            assembler,
        }
    }

    /// Remote paths that no longer correspond to a candidate note.
    pub async fn deleted_note_paths(&self) -> Result<Vec<String>, StatusError> {
        let manifest = self.remote.manifest().await?;
        let candidates = self.store.list_candidate_notes().await?;
        let remote_paths = remote_path_map(&candidates);

        Ok(orphaned_paths(&manifest, &candidates, &remote_paths))
    }

    /// Assemble every candidate and compare its fingerprint with the manifest.
    pub async fn compute_status(&self) -> Result<PublishStatus, StatusError> {
        let manifest = self.remote.manifest().await?;
        let candidates = self.store.list_candidate_notes().await?;
        let remote_paths = remote_path_map(&candidates);

        let mut status = PublishStatus::default();
        for note in &candidates {
            // Manifest keys are remote paths; older sites may still list the vault path
            let published = manifest
                .get(&remote_paths[note.path.as_str()])
                .or_else(|| manifest.get(&note.path));

            let Some(published) = published else {
                status.unpublished_notes.push(note.clone());
                continue;
            };

            match self.assembler.assemble(note).await {
                Ok(content) if Fingerprint::of_text(&content) == *published.as_str() => {
                    status.published_notes.push(note.clone());
                }
                Ok(_) => status.changed_notes.push(note.clone()),
                Err(e) => {
                    tracing::warn!("Counting {} as changed: {}", note.path, e);
                    status.changed_notes.push(note.clone());
                }
            }
        }

        status.deleted_remote_paths = orphaned_paths(&manifest, &candidates, &remote_paths);

        for notes in [
            &mut status.unpublished_notes,
            &mut status.published_notes,
            &mut status.changed_notes,
        ] {
            notes.sort_by(|a, b| a.path.cmp(&b.path));
        }

        tracing::debug!(
            "Status: {} unpublished, {} published, {} changed, {} deleted",
            status.unpublished_notes.len(),
            status.published_notes.len(),
            status.changed_notes.len(),
            status.deleted_remote_paths.len()
        );
        Ok(status)
    }
}

fn remote_path_map(candidates: &[Note]) -> BTreeMap<&str, String> {
    candidates
        .iter()
        .map(|note| (note.path.as_str(), remote_path(&note.path, note.is_home(), note.kind())))
        .collect()
}

/// Manifest keys matching neither a candidate's remote path nor its vault
/// path. Site scripts (`.js`) are never reported.
fn orphaned_paths(manifest: &Manifest, candidates: &[Note], remote_paths: &BTreeMap<&str, String>) -> Vec<String> {
    manifest
        .keys()
        .filter(|key| !key.ends_with(".js"))
        .filter(|key| {
            !candidates
                .iter()
                .any(|note| remote_paths[note.path.as_str()] == **key || note.path == **key)
        })
        .cloned()
        .collect()
}
