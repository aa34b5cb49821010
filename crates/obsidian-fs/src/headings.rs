//! ATX heading extraction.
//!
//! Line numbers are zero-based and count from the first line of the raw file,
//! frontmatter included, so they can be used to slice the raw text directly.

use serde::{Deserialize, Serialize};

/// A heading found in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading text without the `#` markers: "Section"
    pub text: String,
    /// Heading level, 1 through 6
    pub level: u8,
    /// Zero-based line number in the raw file
    pub line: usize,
}

/// Extract headings in document order, skipping frontmatter and fenced code blocks.
pub fn parse_headings(raw: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut in_fence = false;
    let mut in_frontmatter = false;

    for (line_no, line) in raw.lines().enumerate() {
        if line_no == 0 && line.trim_end() == "---" {
            in_frontmatter = true;
            continue;
        }
        if in_frontmatter {
            if line.trim_end() == "---" {
                in_frontmatter = false;
            }
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some(heading) = parse_heading_line(line, line_no) {
            headings.push(heading);
        }
    }

    headings
}

fn parse_heading_line(line: &str, line_no: usize) -> Option<Heading> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }

    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        // "#tag" is a tag, not a heading
        return None;
    }

    // Drop an optional closing sequence: "## Title ##"
    let text = rest.trim();
    let text = match text.trim_end_matches('#') {
        stripped if stripped.len() != text.len() && stripped.ends_with([' ', '\t']) => {
            stripped.trim_end()
        }
        _ => text,
    };

    Some(Heading {
        text: text.to_string(),
        level: hashes as u8,
        line: line_no,
    })
}
