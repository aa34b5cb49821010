//! Obsidian `%%...%%` comments, removed before publishing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::fence::{apply_edits, GuardedText};

/// `%%...%%`, across lines, shortest match
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)%%.+?%%").expect("valid comment regex"));

/// Remove Obsidian comments. Comment markers inside code are kept.
pub fn strip_comments(text: &str) -> String {
    let guarded = GuardedText::new(text);
    let edits: Vec<_> = COMMENT
        .find_iter(guarded.masked())
        .map(|m| (m.range(), String::new()))
        .collect();
    apply_edits(text, edits)
}
