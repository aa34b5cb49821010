//! Inlines embedded images: SVGs as literal markup, raster images as data URIs.

use std::ops::Range;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::fence::{apply_edits, GuardedText};
use crate::vault::{MetadataIndex, NoteStore};

/// `![[x.svg]]` and `![[x.svg|size]]`
static SVG_EMBED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[\[([^\]|\n]*?\.svg)(?:\|([^\]\n]*))?\]\]").expect("valid svg embed regex"));

/// `![alt](x.svg)`
static SVG_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]\n]*)\]\(([^)\n]*?\.svg)\)").expect("valid svg link regex"));

/// `![[x.png]]` and `![[x.png|size]]`
static IMAGE_EMBED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[\[([^\]|\n]*?\.(?:png|jpg|jpeg|gif))(?:\|([^\]\n]*))?\]\]")
        .expect("valid image embed regex")
});

/// `![alt](x.png)`
static IMAGE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[([^\]\n]*)\]\(([^)\n]*?\.(?:png|jpg|jpeg|gif))\)").expect("valid image link regex")
});

/// A matched reference: the whole span plus its captured pieces, read from the
/// original text.
struct Reference {
    span: Range<usize>,
    first: String,
    second: Option<String>,
}

/// Find `pattern` on the guarded copy of `text`.
fn references(text: &str, pattern: &Regex) -> Vec<Reference> {
    let guarded = GuardedText::new(text);
    let capture = |caps: &Captures, group: usize| caps.get(group).map(|m| text[m.range()].to_string());

    pattern
        .captures_iter(guarded.masked())
        .filter_map(|caps| {
            let span = caps.get(0)?.range();
            Some(Reference {
                span,
                first: capture(&caps, 1)?,
                second: capture(&caps, 2),
            })
        })
        .collect()
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http")
}

/// Percent-decode a Markdown image path; undecodable paths are used as written.
fn decode_path(path: &str) -> String {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// MIME subtype for a data URI. JPEGs are labelled `png`, which renderers accept.
fn image_subtype(path: &str) -> String {
    match obsidian_fs::extension(path).map(str::to_ascii_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") | None => "png".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Replace SVG embeds and SVG image links with the SVG file's markup.
pub async fn inline_svg(store: &dyn NoteStore, index: &dyn MetadataIndex, text: &str, local_path: &str) -> String {
    let mut edits = Vec::new();

    for reference in references(text, &SVG_EMBED) {
        if let Some(svg) = read_svg(store, index, &reference.first, local_path).await {
            edits.push((reference.span, svg));
        }
    }
    let text = apply_edits(text, edits);

    let mut edits = Vec::new();
    for reference in references(&text, &SVG_LINK) {
        let Some(path) = reference.second else {
            continue;
        };
        if is_remote(&path) {
            continue;
        }
        if let Some(svg) = read_svg(store, index, &decode_path(&path), local_path).await {
            edits.push((reference.span, svg));
        }
    }

    apply_edits(&text, edits)
}

async fn read_svg(
    store: &dyn NoteStore,
    index: &dyn MetadataIndex,
    link: &str,
    local_path: &str,
) -> Option<String> {
    let Some(target) = index.resolve_link(link, local_path).await else {
        tracing::warn!("Unresolved SVG {} in {}", link, local_path);
        return None;
    };
    match store.read_text(target.path()).await {
        Ok(svg) => Some(svg),
        Err(e) => {
            tracing::warn!("Failed to read SVG {}: {}", target.path(), e);
            None
        }
    }
}

/// Replace raster image embeds and links with base64 data URIs.
pub async fn inline_raster(
    store: &dyn NoteStore,
    index: &dyn MetadataIndex,
    text: &str,
    local_path: &str,
) -> String {
    let mut edits = Vec::new();

    for reference in references(text, &IMAGE_EMBED) {
        let Some(uri) = read_data_uri(store, index, &reference.first, local_path).await else {
            continue;
        };
        let name = match &reference.second {
            Some(size) => format!("{}|{}", reference.first, size),
            None => reference.first.clone(),
        };
        edits.push((reference.span, format!("![{}]({})", name, uri)));
    }
    let text = apply_edits(text, edits);

    let mut edits = Vec::new();
    for reference in references(&text, &IMAGE_LINK) {
        let Some(path) = reference.second else {
            continue;
        };
        if is_remote(&path) {
            continue;
        }
        let Some(uri) = read_data_uri(store, index, &decode_path(&path), local_path).await else {
            continue;
        };
        edits.push((reference.span, format!("![{}]({})", reference.first, uri)));
    }

    apply_edits(&text, edits)
}

async fn read_data_uri(
    store: &dyn NoteStore,
    index: &dyn MetadataIndex,
    link: &str,
    local_path: &str,
) -> Option<String> {
    let Some(target) = index.resolve_link(link, local_path).await else {
        tracing::warn!("Unresolved image {} in {}", link, local_path);
        return None;
    };
    match store.read_binary(target.path()).await {
        Ok(bytes) => Some(format!(
            "data:image/{};base64,{}",
            image_subtype(target.path()),
            STANDARD.encode(bytes)
        )),
        Err(e) => {
            tracing::warn!("Failed to read image {}: {}", target.path(), e);
            None
        }
    }
}
