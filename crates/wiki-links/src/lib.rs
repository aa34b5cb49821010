//! Parser for Obsidian-style wiki links
//!
//! Supports:
//! - Basic links: `[[Note]]`
//! - Aliases: `[[Note|Display Text]]`
//! - Headers: `[[Note#Header]]`
//! - Block references: `[[Note#^block-id]]`
//! - Embeds: `![[Note]]`
//! - Paths: `[[folder/Note]]`
//!
//! Every parsed link carries the byte span it occupies in the source text, so
//! callers can splice a rewritten reference back into the document.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A parsed wiki link from Obsidian markdown content.
///
/// Field naming follows Rust's `std::path::Path` conventions where applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiLink {
    /// The note name without path or extension: "Note" (like `Path::file_stem()`)
    pub name: String,
    /// The parent directory path: "private/knowledge" or None for root (like `Path::parent()`)
    pub parent: Option<String>,
    /// File extension without the dot: "md" or None (like `Path::extension()`)
    pub extension: Option<String>,
    /// Header reference if present: "Header Section"
    pub header: Option<String>,
    /// Block ID if present: "block-123"
    pub block_id: Option<String>,
    /// Display alias if present: "my custom text"
    pub alias: Option<String>,
    /// Whether this is an embed (`![[...]]`)
    pub is_embed: bool,
    /// Everything between the brackets before the `|`: "folder/Note#Header"
    pub target: String,
    /// Byte range of the whole reference in the parsed text, including `!` for embeds
    pub span: Range<usize>,
}

impl WikiLink {
    /// Returns the file name with extension if present: "Note.md" or "Note"
    pub fn file_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.name, ext),
            None => self.name.clone(),
        }
    }

    /// Returns the full path without fragment: "private/knowledge/Note.md"
    pub fn path(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}/{}", parent, self.file_name()),
            None => self.file_name(),
        }
    }

    /// Returns the fragment including its marker: "#Header", "#^block-id" or ""
    pub fn fragment(&self) -> String {
        if let Some(block_id) = &self.block_id {
            format!("#^{}", block_id)
        } else if let Some(header) = &self.header {
            format!("#{}", header)
        } else {
            String::new()
        }
    }

    /// Returns alias if present, otherwise the name
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Returns alias if present and non-empty, otherwise the raw target ("Note#Header")
    pub fn label(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|alias| !alias.is_empty())
            .unwrap_or(&self.target)
    }
}

/// Parse all wiki links from markdown content
pub fn parse_wiki_links(content: &str) -> Vec<WikiLink> {
    let mut links = Vec::new();
    let bytes = content.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        // Check for embed: ![[
        if i + 2 < len && bytes[i] == b'!' && bytes[i + 1] == b'[' && bytes[i + 2] == b'[' {
            if let Some((link, end)) = parse_link_at(content, i + 1, true) {
                links.push(link);
                i = end;
                continue;
            }
        }
        // Check for regular link: [[ (but not preceded by !)
        if i + 1 < len && bytes[i] == b'[' && bytes[i + 1] == b'[' {
            if i == 0 || bytes[i - 1] != b'!' {
                if let Some((link, end)) = parse_link_at(content, i, false) {
                    links.push(link);
                    i = end;
                    continue;
                }
            }
        }
        i += 1;
    }

    links
}

/// Parse a link starting at byte `start` (pointing to first `[`)
/// Returns the parsed link and the byte position after the closing `]]`
fn parse_link_at(content: &str, start: usize, is_embed: bool) -> Option<(WikiLink, usize)> {
    let bytes = content.as_bytes();
    let len = bytes.len();

    if start + 1 >= len || bytes[start] != b'[' || bytes[start + 1] != b'[' {
        return None;
    }

    let content_start = start + 2;
    let mut i = content_start;
    let mut depth = 1;

    while i < len {
        // Links never span lines
        if bytes[i] == b'\n' {
            return None;
        }
        if i + 1 < len && bytes[i] == b']' && bytes[i + 1] == b']' {
            depth -= 1;
            if depth == 0 {
                let inner = &content[content_start..i];
                let span_start = if is_embed { start - 1 } else { start };
                let link = parse_link_content(inner, is_embed, span_start..i + 2);
                return Some((link, i + 2));
            }
        }
        if i + 1 < len && bytes[i] == b'[' && bytes[i + 1] == b'[' {
            depth += 1;
            i += 2;
            continue;
        }
        i += 1;
    }

    None
}

/// Parse the content inside [[ ]] into a WikiLink
fn parse_link_content(content: &str, is_embed: bool, span: Range<usize>) -> WikiLink {
    let (target_part, alias) = match content.find('|') {
        Some(pipe_pos) => (&content[..pipe_pos], Some(content[pipe_pos + 1..].to_string())),
        None => (content, None),
    };

    let (path_part, header, block_id) = parse_fragment(target_part);
    let (parent, name, extension) = parse_path(path_part);

    WikiLink {
        name,
        parent,
        extension,
        header,
        block_id,
        alias,
        is_embed,
        target: target_part.to_string(),
        span,
    }
}

/// Parse a target string to extract the path and any fragment (header or block reference)
/// Returns (path_part, header, block_id)
fn parse_fragment(target: &str) -> (&str, Option<String>, Option<String>) {
    if let Some(block_pos) = target.find("#^") {
        let path_part = &target[..block_pos];
        let block_id = &target[block_pos + 2..];
        return (path_part, None, Some(block_id.to_string()));
    }

    // Nested headings (Note#A#B) keep only the first level
    if let Some(header_pos) = target.find('#') {
        let path_part = &target[..header_pos];
        let header = target[header_pos + 1..].split('#').next().unwrap_or_default();
        return (path_part, Some(header.to_string()), None);
    }

    (target, None, None)
}

/// Parse a path string into parent, name, and extension
/// Returns (parent, name, extension)
fn parse_path(path: &str) -> (Option<String>, String, Option<String>) {
    let path = path.trim();

    let (parent, file_name) = match path.rfind('/') {
        Some(slash_pos) => (Some(path[..slash_pos].to_string()), &path[slash_pos + 1..]),
        None => (None, path),
    };

    // Split file_name into name and extension at the last dot
    let (name, extension) = match file_name.rfind('.') {
        Some(dot_pos) if dot_pos > 0 => (
            file_name[..dot_pos].to_string(),
            Some(file_name[dot_pos + 1..].to_string()),
        ),
        _ => (file_name.to_string(), None),
    };

    (parent, name, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_wiki_links() {
        let content = "- [[Garden]] then [[Garden.canvas]]";
        let links = parse_wiki_links(content);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name, "Garden");
        assert_eq!(links[0].parent, None);
        assert_eq!(links[0].extension, None);
        assert!(!links[0].is_embed);
        assert_eq!(links[1].name, "Garden");
        assert_eq!(links[1].extension, Some("canvas".to_string()));
        assert_eq!(links[1].file_name(), "Garden.canvas");
    }

    #[test]
    fn spans_cover_the_reference() {
        let content = "See [[Note|alias]] and ![[Image.png]].";
        let links = parse_wiki_links(content);

        assert_eq!(&content[links[0].span.clone()], "[[Note|alias]]");
        assert_eq!(&content[links[1].span.clone()], "![[Image.png]]");
    }

    #[test]
    fn spans_are_byte_offsets_after_multibyte_text() {
        let content = "Café ☕ [[Über]]";
        let links = parse_wiki_links(content);

        assert_eq!(links.len(), 1);
        assert_eq!(&content[links[0].span.clone()], "[[Über]]");
        assert_eq!(links[0].name, "Über");
    }

    #[test]
    fn parse_links_with_aliases() {
        let content = "[[Note Name|Display Text]]";
        let links = parse_wiki_links(content);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "Note Name");
        assert_eq!(links[0].alias, Some("Display Text".to_string()));
        assert_eq!(links[0].display_name(), "Display Text");
        assert_eq!(links[0].label(), "Display Text");
    }

    #[test]
    fn parse_links_with_headers() {
        let content = "[[Note#Header Section]]";
        let links = parse_wiki_links(content);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "Note");
        assert_eq!(links[0].header, Some("Header Section".to_string()));
        assert_eq!(links[0].fragment(), "#Header Section");
        assert_eq!(links[0].target, "Note#Header Section");
        assert_eq!(links[0].label(), "Note#Header Section");
    }

    #[test]
    fn empty_alias_labels_with_target() {
        let links = parse_wiki_links("[[Note#Intro|]]");
        assert_eq!(links[0].label(), "Note#Intro");
    }

    #[test]
    fn nested_headers_keep_first_level() {
        let links = parse_wiki_links("[[Note#Top#Inner]]");
        assert_eq!(links[0].header, Some("Top".to_string()));
    }

    #[test]
    fn parse_links_with_block_references() {
        let content = "[[Note#^block-123]]";
        let links = parse_wiki_links(content);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "Note");
        assert_eq!(links[0].block_id, Some("block-123".to_string()));
        assert_eq!(links[0].fragment(), "#^block-123");
    }

    #[test]
    fn parse_embed_links() {
        let content = "![[Image]]";
        let links = parse_wiki_links(content);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "Image");
        assert!(links[0].is_embed);
    }

    #[test]
    fn parse_links_with_paths() {
        let content = "[[folder/subfolder/Note]]";
        let links = parse_wiki_links(content);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "Note");
        assert_eq!(links[0].parent, Some("folder/subfolder".to_string()));
        assert_eq!(links[0].path(), "folder/subfolder/Note");
    }

    #[test]
    fn links_do_not_span_lines() {
        let links = parse_wiki_links("[[broken\nlink]] and [[Fine]]");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].name, "Fine");
    }

    #[test]
    fn dotfile_names_have_no_extension() {
        let links = parse_wiki_links("[[.hidden]]");
        assert_eq!(links[0].name, ".hidden");
        assert_eq!(links[0].extension, None);
    }

    #[test]
    fn parse_full_complex_link() {
        let content = "[[private/knowledge/Note.md#header|my note]]";
        let links = parse_wiki_links(content);

        assert_eq!(links.len(), 1);
        let link = &links[0];
        assert_eq!(link.name, "Note");
        assert_eq!(link.parent, Some("private/knowledge".to_string()));
        assert_eq!(link.extension, Some("md".to_string()));
        assert_eq!(link.header, Some("header".to_string()));
        assert_eq!(link.alias, Some("my note".to_string()));
        assert_eq!(link.file_name(), "Note.md");
        assert_eq!(link.path(), "private/knowledge/Note.md");
        assert_eq!(link.display_name(), "my note");
    }
}
