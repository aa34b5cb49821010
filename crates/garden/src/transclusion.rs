//! Inlines `![[...]]` embeds of other notes, recursively up to a fixed depth.

use obsidian_fs::{strip_frontmatter, Heading};
use thiserror::Error;
use wiki_links::WikiLink;

use crate::drawing::{render_drawing, DrawingError};
use crate::fence::{apply_edits, unguarded_links};
use crate::vault::{resolve_wiki_link, LinkTarget, MetadataIndex, NoteStore, StoreError};

/// Calls at this depth or deeper return their input unchanged.
pub const MAX_DEPTH: usize = 4;

const TITLE_VARIABLE: &str = "{{title}}";

/// Failure to inline one embed. Never fatal: the embed is left as written.
#[derive(Debug, Error)]
enum EmbedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Drawing(#[from] DrawingError),
}

/// Replace every embed in `text` (a note at `local_path`) with the content it
/// points at.
///
/// - drawing documents become a rendered drawing; only the first one in a call
///   carries the bootstrap scripts
/// - text documents are wrapped in an embed container, narrowed to one section
///   when the embed names a heading, and resolved again one level deeper
/// - resources and unresolved embeds are left as written
pub async fn resolve_transclusions(
    store: &dyn NoteStore,
    index: &dyn MetadataIndex,
    text: &str,
    local_path: &str,
    depth: usize,
) -> String {
    if depth >= MAX_DEPTH {
        tracing::debug!("Transclusion depth limit reached in {}", local_path);
        return text.to_string();
    }

    let mut edits = Vec::new();
    let mut drawings = 0usize;

    for embed in unguarded_links(text).into_iter().filter(|link| link.is_embed) {
        let Some(target) = resolve_wiki_link(index, &embed, local_path).await else {
            continue;
        };

        let replacement = match &target {
            LinkTarget::Resource(_) => continue,
            LinkTarget::Document(path) if target.is_drawing() => {
                drawings += 1;
                embed_drawing(store, path, drawings).await
            }
            LinkTarget::Document(path) => embed_note(store, index, &embed, path, depth).await,
        };

        match replacement {
            Ok(replacement) => edits.push((embed.span.clone(), replacement)),
            Err(e) => tracing::warn!(
                "Leaving embed {} in {} unchanged: {}",
                &text[embed.span.clone()],
                local_path,
                e
            ),
        }
    }

    apply_edits(text, edits)
}

async fn embed_drawing(store: &dyn NoteStore, path: &str, counter: usize) -> Result<String, EmbedError> {
    let raw = store.read_text(path).await?;
    let html = render_drawing(&raw, obsidian_fs::file_name(path), counter == 1, &counter.to_string())?;
    Ok(html)
}

async fn embed_note(
    store: &dyn NoteStore,
    index: &dyn MetadataIndex,
    embed: &WikiLink,
    path: &str,
    depth: usize,
) -> Result<String, EmbedError> {
    let raw = store.read_text(path).await?;

    let section = match &embed.header {
        Some(header) => {
            let headings = index.headings(path).await?;
            narrow_to_heading(&raw, &headings, header)
        }
        None => raw,
    };

    let header = embed
        .alias
        .as_deref()
        .and_then(|alias| alias.split('|').next())
        .filter(|label| !label.is_empty())
        .map(|label| embed_header(label, obsidian_fs::basename(path)));
    let wrapped = wrap_embed(strip_frontmatter(&section), header.as_deref());

    if wrapped.contains("![[") {
        Ok(Box::pin(resolve_transclusions(store, index, &wrapped, path, depth + 1)).await)
    } else {
        Ok(wrapped)
    }
}

/// Lines from the heading named `header` up to (not including) the next
/// heading of any level. The whole text when no heading matches.
fn narrow_to_heading(raw: &str, headings: &[Heading], header: &str) -> String {
    let Some(position) = headings.iter().position(|h| h.text == header) else {
        return raw.to_string();
    };
    let start = headings[position].line;
    let end = headings.get(position + 1).map(|next| next.line);

    raw.split('\n')
        .enumerate()
        .filter(|(line, _)| *line >= start && end.is_none_or(|end| *line < end))
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Heading shown above an embed, from its label.
///
/// `{{title}}` becomes the embedded note's name; a label without a leading `#`
/// becomes a level-one heading.
fn embed_header(label: &str, title: &str) -> String {
    let label = label.replacen(TITLE_VARIABLE, title, 1);

    let hashes = label.len() - label.trim_start_matches('#').len();
    if hashes == 0 {
        return format!("# {}", label);
    }

    let rest = &label[hashes..];
    if rest.starts_with(' ') {
        label
    } else {
        format!("{} {}", &label[..hashes], rest)
    }
}

fn wrap_embed(content: &str, header: Option<&str>) -> String {
    let header_section = header
        .map(|header| format!("<div class=\"markdown-embed-title\">\n\n{}\n\n</div>\n", header))
        .unwrap_or_default();

    format!(
        "\n<div class=\"transclusion internal-embed is-loaded\"><div class=\"markdown-embed\">\n\n{}\n\n{}\n\n</div></div>\n",
        header_section, content
    )
}
