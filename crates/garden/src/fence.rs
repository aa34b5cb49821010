//! Protected spans: code fences, inline code and embedded drawing markers.
//!
//! Rewrite stages search a guarded copy of the text in which every protected
//! byte is blanked to a space. The copy has the same byte length as the
//! original, so match offsets found on it are valid on the original text and
//! nothing inside a protected span can ever match.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use wiki_links::{parse_wiki_links, WikiLink};

/// `:[[12,34],...]]` markers left behind by inline Excalidraw embeds
static DRAWING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\[\[(\d*?,\d*?)\],.*?\]\]").expect("valid drawing marker regex"));

/// Fenced code blocks: an opening ``` line through the next ```
static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[^\n]*\n(?s:.+?)```").expect("valid code block regex"));

/// Inline code spans on a single line
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`\n]*`").expect("valid inline code regex"));

/// A text with every protected byte blanked to a space.
#[derive(Debug, Clone)]
pub struct GuardedText {
    masked: String,
}

impl GuardedText {
    /// Scan `text` for drawing markers, then code blocks, then inline code.
    /// Each pass runs on the output of the previous one.
    pub fn new(text: &str) -> Self {
        let mut masked = text.to_string();

        for pattern in [&*DRAWING_MARKER, &*CODE_BLOCK, &*INLINE_CODE] {
            let found: Vec<Range<usize>> = pattern.find_iter(&masked).map(|m| m.range()).collect();
            if !found.is_empty() {
                masked = blank_out(&masked, &found);
            }
        }

        Self { masked }
    }

    /// The guarded copy: same length as the original, protected bytes blanked.
    pub fn masked(&self) -> &str {
        &self.masked
    }
}

/// Wiki links and embeds lying outside every protected span.
///
/// Links are located on the guarded copy, then parsed again from the original
/// text so aliases keep any characters the guard blanked.
pub(crate) fn unguarded_links(text: &str) -> Vec<WikiLink> {
    let guarded = GuardedText::new(text);
    parse_wiki_links(guarded.masked())
        .into_iter()
        .filter_map(|found| {
            let span = found.span;
            let mut link = parse_wiki_links(&text[span.clone()]).into_iter().next()?;
            if link.span != (0..span.len()) {
                return None;
            }
            link.span = span;
            Some(link)
        })
        .collect()
}

/// Replace each range with spaces of the same byte length.
fn blank_out(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in ranges {
        out.push_str(&text[cursor..range.start]);
        out.extend(std::iter::repeat_n(' ', range.end - range.start));
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Splice non-overlapping `(range, replacement)` edits into `text`.
///
/// Edits may arrive in any order; overlapping edits after the first are dropped.
pub(crate) fn apply_edits(text: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    if edits.is_empty() {
        return text.to_string();
    }
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        if range.start < cursor {
            tracing::debug!("Dropping overlapping edit at {:?}", range);
            continue;
        }
        out.push_str(&text[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_code_blocks_keeping_length() {
        let text = "before\n```rust\nlet x = [[Note]];\n```\nafter [[Real]]";
        let guarded = GuardedText::new(text);

        assert_eq!(guarded.masked().len(), text.len());
        assert!(!guarded.masked().contains("[[Note]]"));
        assert!(guarded.masked().contains("[[Real]]"));
        assert!(guarded.masked().starts_with("before\n"));
    }

    #[test]
    fn masks_inline_code() {
        let text = "use `[[Literal]]` or [[Link]]";
        let guarded = GuardedText::new(text);

        assert!(!guarded.masked().contains("[[Literal]]"));
        let link = text.find("[[Link]]").unwrap();
        assert_eq!(&guarded.masked()[link..link + 8], "[[Link]]");
        assert_eq!(guarded.masked(), format!("use {} or [[Link]]", " ".repeat(13)));
    }

    #[test]
    fn backticks_inside_blocks_do_not_pair_with_outside() {
        let text = "```\ncode ` here\n```\nthen `inline` and [[Link]]";
        let guarded = GuardedText::new(text);
        assert!(guarded.masked().contains("[[Link]]"));
        assert!(!guarded.masked().contains("inline"));
    }

    #[test]
    fn masks_drawing_markers() {
        let text = "x :[[12,34],{\"a\":1}]] y";
        let guarded = GuardedText::new(text);
        assert!(!guarded.masked().contains("[["));
    }

    #[test]
    fn masking_multibyte_text_keeps_offsets() {
        let text = "é `ü` [[Ö]]";
        let guarded = GuardedText::new(text);
        assert_eq!(guarded.masked().len(), text.len());
        let at = guarded.masked().find("[[Ö]]").unwrap();
        assert_eq!(&text[at..at + "[[Ö]]".len()], "[[Ö]]");
    }

    #[test]
    fn unguarded_links_keep_original_alias() {
        let text = "[[A|see `x`]] `[[B]]` ![[C]]";
        let links = unguarded_links(text);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].alias.as_deref(), Some("see `x`"));
        assert!(links[1].is_embed);
        assert_eq!(&text[links[1].span.clone()], "![[C]]");
    }

    #[test]
    fn apply_edits_out_of_order() {
        let text = "aaa bbb ccc";
        let out = apply_edits(text, vec![(8..11, "C".into()), (0..3, "A".into())]);
        assert_eq!(out, "A bbb C");
    }

    #[test]
    fn apply_edits_drops_overlaps() {
        let out = apply_edits("abcdef", vec![(0..4, "X".into()), (2..5, "Y".into())]);
        assert_eq!(out, "Xef");
    }
}
