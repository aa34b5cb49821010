//! Rewrites `[[...]]` links so every one carries an explicit label and points at
//! the resolved vault path.

use crate::fence::{apply_edits, unguarded_links};
use crate::vault::{resolve_wiki_link, LinkTarget, MetadataIndex};

/// Rewrite the non-embed wiki links of `text`, a note at `local_path`.
///
/// - unresolved: `[[<path><fragment>|<label>]]`
/// - resolved document: `[[<resolved path without extension><fragment>|<label>]]`
/// - resolved resource: left unchanged
///
/// Links inside code fences, inline code or drawing markers are never touched.
pub async fn rewrite_links(index: &dyn MetadataIndex, text: &str, local_path: &str) -> String {
    let mut edits = Vec::new();

    for link in unguarded_links(text) {
        if link.is_embed {
            continue;
        }
        if link.path().trim().is_empty() {
            tracing::warn!("Skipping link with empty target in {}: {}", local_path, &text[link.span.clone()]);
            continue;
        }

        let replacement = match resolve_wiki_link(index, &link, local_path).await {
            None => format!("[[{}{}|{}]]", link.path(), link.fragment(), link.label()),
            Some(LinkTarget::Resource(_)) => continue,
            Some(LinkTarget::Document(path)) => format!(
                "[[{}{}|{}]]",
                obsidian_fs::strip_extension(&path),
                link.fragment(),
                link.label()
            ),
        };
        edits.push((link.span.clone(), replacement));
    }

    tracing::debug!("Rewriting {} links in {}", edits.len(), local_path);
    apply_edits(text, edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::InMemoryVault;

    fn vault() -> InMemoryVault {
        InMemoryVault::new()
            .with_note("notes/Target.md", "t")
            .with_note("art/Sketch.excalidraw.md", "d")
            .with_file("files/doc.pdf", b"%PDF")
    }

    #[tokio::test]
    async fn resolved_links_get_full_path_and_label() {
        let out = rewrite_links(&vault(), "see [[Target]] now", "Index.md").await;
        assert_eq!(out, "see [[notes/Target|Target]] now");
    }

    #[tokio::test]
    async fn fragment_and_alias_are_kept() {
        let vault = vault();
        let out = rewrite_links(&vault, "[[Target#Intro]]", "Index.md").await;
        assert_eq!(out, "[[notes/Target#Intro|Target#Intro]]");

        let out = rewrite_links(&vault, "[[Target#^blk|see here]]", "Index.md").await;
        assert_eq!(out, "[[notes/Target#^blk|see here]]");
    }

    #[tokio::test]
    async fn empty_alias_falls_back_to_target() {
        let vault = vault();
        let out = rewrite_links(&vault, "[[Target|]]", "Index.md").await;
        assert_eq!(out, "[[notes/Target|Target]]");

        let out = rewrite_links(&vault, "[[Ghost|]]", "Index.md").await;
        assert_eq!(out, "[[Ghost|Ghost]]");
    }

    #[tokio::test]
    async fn unresolved_links_get_explicit_label() {
        let out = rewrite_links(&vault(), "[[Ghost#H]]", "Index.md").await;
        assert_eq!(out, "[[Ghost#H|Ghost#H]]");
    }

    #[tokio::test]
    async fn resources_embeds_and_empty_targets_unchanged() {
        let vault = vault();
        let text = "[[doc.pdf]] ![[Target]] [[#Local]]";
        assert_eq!(rewrite_links(&vault, text, "Index.md").await, text);
    }

    #[tokio::test]
    async fn drawing_links_drop_only_md() {
        let out = rewrite_links(&vault(), "[[Sketch.excalidraw]]", "Index.md").await;
        assert_eq!(out, "[[art/Sketch.excalidraw|Sketch.excalidraw]]");
    }

    #[tokio::test]
    async fn fenced_and_inline_code_untouched() {
        let text = "```\n[[Target]]\n```\n`[[Target]]` and [[Target]]";
        let out = rewrite_links(&vault(), text, "Index.md").await;
        assert_eq!(
            out,
            "```\n[[Target]]\n```\n`[[Target]]` and [[notes/Target|Target]]"
        );
    }
}
