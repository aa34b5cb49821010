//! YAML frontmatter parsing for Obsidian notes
//!
//! Parses the YAML frontmatter block at the start of markdown files:
//! ```markdown
//! ---
//! title: My Note
//! tags: [rust, wasm]
//! ---
//!
//! Note content here...
//! ```
//!
//! Published notes carry their frontmatter as compact JSON, which every YAML
//! reader accepts and which serializes deterministically.

use serde_json::Value as JsonValue;

/// Parsed frontmatter as an ordered map of string keys to JSON values.
/// Key order follows the authoring order (serde_json `preserve_order`).
pub type Frontmatter = serde_json::Map<String, JsonValue>;

/// A parsed note with frontmatter separated from content.
///
/// The `content` field borrows from `raw` to avoid unnecessary allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNote<'a> {
    /// The frontmatter key-value pairs, if present
    pub frontmatter: Option<Frontmatter>,
    /// The note content after the frontmatter (borrows from raw)
    pub content: &'a str,
    /// The raw file content (frontmatter + content)
    pub raw: &'a str,
}

/// Split a note into frontmatter YAML string and content, without parsing the YAML.
///
/// Leading whitespace before the opening `---` is tolerated. Returns
/// (frontmatter_yaml, content) where frontmatter_yaml is None if no valid
/// frontmatter block was found.
pub fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with("---") {
        return (None, raw);
    }

    let after_opening = &trimmed[3..];
    let content_start = if let Some(rest) = after_opening.strip_prefix('\n') {
        rest
    } else if let Some(rest) = after_opening.strip_prefix("\r\n") {
        rest
    } else {
        // No newline after opening --- means invalid frontmatter
        return (None, raw);
    };

    match find_closing_delimiter(content_start) {
        Some(close_pos) => {
            let yaml = &content_start[..close_pos];
            let after_close = &content_start[close_pos + 3..];

            let content = after_close
                .strip_prefix('\n')
                .or_else(|| after_close.strip_prefix("\r\n"))
                .unwrap_or(after_close);

            (Some(yaml), content)
        }
        None => (None, raw),
    }
}

/// Return the note body with any frontmatter block removed.
pub fn strip_frontmatter(raw: &str) -> &str {
    split_frontmatter(raw).1
}

/// Find the byte position of the closing --- delimiter (must be at start of line)
fn find_closing_delimiter(s: &str) -> Option<usize> {
    let mut pos = 0;
    for line in s.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if bare == "---" {
            return Some(pos);
        }
        pos += line.len();
    }
    None
}

/// Parse a note's raw content into frontmatter and content.
///
/// The frontmatter is parsed as YAML and converted to an ordered map with JSON values.
/// Invalid YAML is treated as absent frontmatter.
pub fn parse_frontmatter(raw: &str) -> ParsedNote<'_> {
    let (yaml_str, content) = split_frontmatter(raw);

    let frontmatter = yaml_str.and_then(|yaml| {
        serde_yaml::from_str::<serde_yaml::Value>(yaml)
            .ok()
            .and_then(yaml_to_json_map)
    });

    ParsedNote {
        frontmatter,
        content,
        raw,
    }
}

/// Render a published frontmatter block: `---\n<json>\n---\n`.
pub fn render_frontmatter(frontmatter: &Frontmatter) -> String {
    format!("---\n{}\n---\n", JsonValue::Object(frontmatter.clone()))
}

/// Convert a YAML value to a JSON map (for the top-level frontmatter)
fn yaml_to_json_map(yaml: serde_yaml::Value) -> Option<Frontmatter> {
    match yaml {
        serde_yaml::Value::Mapping(map) => {
            let mut result = Frontmatter::new();
            for (k, v) in map {
                if let Some(key) = yaml_key(k) {
                    result.insert(key, yaml_to_json(v));
                }
            }
            if result.is_empty() {
                None
            } else {
                Some(result)
            }
        }
        _ => None,
    }
}

/// YAML allows non-string keys; frontmatter keys are strings, numbers and booleans at most.
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Convert a YAML value to a JSON value
fn yaml_to_json(yaml: serde_yaml::Value) -> JsonValue {
    match yaml {
        serde_yaml::Value::Null => JsonValue::Null,
        serde_yaml::Value::Bool(b) => JsonValue::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::Number(i.into())
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            } else {
                JsonValue::Null
            }
        }
        serde_yaml::Value::String(s) => JsonValue::String(s),
        serde_yaml::Value::Sequence(seq) => {
            JsonValue::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let obj: serde_json::Map<String, JsonValue> = map
                .into_iter()
                .filter_map(|(k, v)| yaml_key(k).map(|key| (key, yaml_to_json(v))))
                .collect();
            JsonValue::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_note_with_frontmatter() {
        let raw = "---\ntitle: Test\n---\n\nContent here";
        let (yaml, content) = split_frontmatter(raw);
        assert_eq!(yaml, Some("title: Test\n"));
        assert_eq!(content, "\nContent here");
    }

    #[test]
    fn split_tolerates_leading_whitespace() {
        let raw = "\n  ---\ntitle: Test\n---\nBody";
        let (yaml, content) = split_frontmatter(raw);
        assert_eq!(yaml, Some("title: Test\n"));
        assert_eq!(content, "Body");
    }

    #[test]
    fn split_handles_crlf() {
        let raw = "---\r\ntitle: Test\r\n---\r\nBody";
        let (yaml, content) = split_frontmatter(raw);
        assert_eq!(yaml, Some("title: Test\r\n"));
        assert_eq!(content, "Body");
    }

    #[test]
    fn split_note_without_frontmatter() {
        let raw = "Just content, no frontmatter";
        let (yaml, content) = split_frontmatter(raw);
        assert!(yaml.is_none());
        assert_eq!(content, raw);
    }

    #[test]
    fn split_note_with_incomplete_frontmatter() {
        let raw = "---\ntitle: Test\nNo closing delimiter";
        let (yaml, content) = split_frontmatter(raw);
        assert!(yaml.is_none());
        assert_eq!(content, raw);
    }

    #[test]
    fn strip_returns_body() {
        assert_eq!(strip_frontmatter("---\na: 1\n---\n# Hi"), "# Hi");
        assert_eq!(strip_frontmatter("# Hi"), "# Hi");
    }

    #[test]
    fn parse_simple_frontmatter_keeps_order() {
        let raw = "---\nzeta: 1\ntitle: My Note\ntags:\n  - rust\n  - wasm\n---\n\nNote content";
        let parsed = parse_frontmatter(raw);

        let fm = parsed.frontmatter.unwrap();
        let keys: Vec<&str> = fm.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "title", "tags"]);
        assert_eq!(fm.get("title"), Some(&JsonValue::String("My Note".to_string())));
        assert_eq!(fm.get("tags").and_then(|t| t.as_array()).map(Vec::len), Some(2));
        assert_eq!(parsed.content, "\nNote content");
    }

    #[test]
    fn parse_frontmatter_with_booleans() {
        let raw = "---\ndg-publish: true\ndg-home: false\n---\nContent";
        let fm = parse_frontmatter(raw).frontmatter.unwrap();
        assert_eq!(fm.get("dg-publish"), Some(&JsonValue::Bool(true)));
        assert_eq!(fm.get("dg-home"), Some(&JsonValue::Bool(false)));
    }

    #[test]
    fn parse_empty_frontmatter() {
        let parsed = parse_frontmatter("---\n---\nContent");
        assert!(parsed.frontmatter.is_none());
        assert_eq!(parsed.content, "Content");
    }

    #[test]
    fn invalid_yaml_is_treated_as_absent() {
        let parsed = parse_frontmatter("---\n: : :\n  - [\n---\nContent");
        assert!(parsed.frontmatter.is_none());
        assert_eq!(parsed.content, "Content");
    }

    #[test]
    fn render_uses_compact_json() {
        let mut fm = Frontmatter::new();
        fm.insert("title".into(), JsonValue::String("A".into()));
        fm.insert("dg-publish".into(), JsonValue::Bool(true));
        assert_eq!(
            render_frontmatter(&fm),
            "---\n{\"title\":\"A\",\"dg-publish\":true}\n---\n"
        );
    }
}
