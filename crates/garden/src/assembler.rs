//! Turns a vault note into the exact document that gets published.

use std::sync::Arc;

use obsidian_fs::{render_frontmatter, strip_frontmatter, Frontmatter};
use thiserror::Error;

use crate::comments::strip_comments;
use crate::drawing::{render_drawing, DrawingError};
use crate::frontmatter::normalize;
use crate::links::rewrite_links;
use crate::media::{inline_raster, inline_svg};
use crate::query::{resolve_query_blocks, QueryEngine};
use crate::settings::NoteSettings;
use crate::transclusion::resolve_transclusions;
use crate::vault::{DocumentKind, MetadataIndex, Note, NoteStore, StoreError};

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Drawing(#[from] DrawingError),
}

/// Runs the publishing pipeline over one note at a time.
///
/// Stage order: published frontmatter, transclusions, query blocks, links,
/// comments, SVG images, raster images, trim. Drawing notes skip the pipeline
/// and publish as frontmatter plus the rendered drawing.
pub struct Assembler {
    store: Arc<dyn NoteStore>,
    index: Arc<dyn MetadataIndex>,
    query_engine: Option<Arc<dyn QueryEngine>>,
    settings: NoteSettings,
}

impl Assembler {
    pub fn new(store: Arc<dyn NoteStore>, index: Arc<dyn MetadataIndex>, settings: NoteSettings) -> Self {
        Self {
            store,
            index,
            query_engine: None,
            settings,
        }
    }

    /// Render dataview blocks with `engine` instead of publishing them as written.
    pub fn with_query_engine(mut self, engine: Arc<dyn QueryEngine>) -> Self {
        self.query_engine = Some(engine);
        self
    }

    /// The frontmatter block the note is published with.
    pub async fn published_frontmatter(&self, note: &Note) -> Frontmatter {
        let local = match self.index.frontmatter(&note.path).await {
            Ok(local) => local,
            Err(e) => {
                tracing::warn!("Using listed frontmatter for {}: {}", note.path, e);
                Some(note.frontmatter.clone())
            }
        };
        normalize(local.as_ref(), &self.settings, &note.path)
    }

    /// Produce the published document for `note`.
    pub async fn assemble(&self, note: &Note) -> Result<String, AssembleError> {
        let path = note.path.as_str();
        let raw = self
            .store
            .read_text(path)
            .await
            .map_err(|source| AssembleError::Read {
                path: path.to_string(),
                source,
            })?;
        let header = render_frontmatter(&self.published_frontmatter(note).await);

        if note.kind() == DocumentKind::Drawing {
            let drawing = render_drawing(&raw, obsidian_fs::file_name(path), true, "")?;
            return Ok(format!("{}{}", header, drawing));
        }

        let store = self.store.as_ref();
        let index = self.index.as_ref();

        let text = resolve_transclusions(store, index, strip_frontmatter(&raw), path, 0).await;
        let text = resolve_query_blocks(&text, path, self.query_engine.as_deref()).await;
        let text = rewrite_links(index, &text, path).await;
        let text = strip_comments(&text);
        let text = inline_svg(store, index, &text, path).await;
        let text = inline_raster(store, index, &text, path).await;

        tracing::debug!("Assembled {}", path);
        Ok(format!("{}{}", header, text).trim().to_string())
    }
}
