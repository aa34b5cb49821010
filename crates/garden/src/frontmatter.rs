//! Published frontmatter: the metadata block a note carries on the site.

use obsidian_fs::{generate_url_path, kebabize, Frontmatter};
use serde_json::Value as JsonValue;

use crate::settings::{NoteSettings, NOTE_SETTING_KEYS};

/// Tag that marks the home note for the site templates.
pub const HOME_TAG: &str = "gardenEntry";

/// Position metadata some indexers attach; never published.
const POSITION_KEY: &str = "position";

/// Build the published frontmatter for the note at `local_path`.
///
/// The computed block holds `title`, `dg-publish`, the permalink, the home tag
/// and any per-note setting overrides. When `dgPassFrontmatter` ends up true the
/// note's own keys are published too, with computed values taking precedence.
pub fn normalize(local: Option<&Frontmatter>, settings: &NoteSettings, local_path: &str) -> Frontmatter {
    let local: Frontmatter = local
        .map(|fm| {
            fm.iter()
                .filter(|(key, _)| key.as_str() != POSITION_KEY)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    let mut published = Frontmatter::new();
    let title = match local.get("title") {
        Some(title) if !title.is_null() => title.clone(),
        _ => JsonValue::String(obsidian_fs::basename(local_path).to_string()),
    };
    published.insert("title".into(), title);
    published.insert("dg-publish".into(), JsonValue::Bool(true));

    add_permalink(&local, &mut published, local_path);
    add_home_tag(&local, &mut published);
    add_note_settings(&local, &mut published, settings);

    if published.get("dgPassFrontmatter") == Some(&JsonValue::Bool(true)) {
        let mut full = local;
        for (key, value) in published {
            full.insert(key, value);
        }
        full
    } else {
        published
    }
}

fn add_permalink(local: &Frontmatter, published: &mut Frontmatter, local_path: &str) {
    let explicit = match local.get("dg-permalink") {
        Some(JsonValue::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(JsonValue::Null) | Some(JsonValue::String(_)) | None => None,
        Some(other) => Some(other.to_string()),
    };

    let permalink = match explicit {
        Some(raw) => {
            published.insert("dg-permalink".into(), JsonValue::String(raw.clone()));
            let mut permalink = raw;
            if !permalink.ends_with('/') {
                permalink.push('/');
            }
            if !permalink.starts_with('/') {
                permalink.insert(0, '/');
            }
            permalink
        }
        None => format!("/{}", generate_url_path(local_path)),
    };

    published.insert("permalink".into(), JsonValue::String(permalink));
}

fn add_home_tag(local: &Frontmatter, published: &mut Frontmatter) {
    if local.get("dg-home") != Some(&JsonValue::Bool(true)) {
        return;
    }

    let home = JsonValue::String(HOME_TAG.to_string());
    let tags = match local.get("tags") {
        Some(JsonValue::Array(tags)) => {
            let mut tags = tags.clone();
            tags.push(home);
            tags
        }
        Some(JsonValue::Null) | None => vec![home],
        Some(scalar) => vec![scalar.clone(), home],
    };

    published.insert("tags".into(), JsonValue::Array(tags));
}

fn add_note_settings(local: &Frontmatter, published: &mut Frontmatter, settings: &NoteSettings) {
    for key in NOTE_SETTING_KEYS {
        if let Some(value) = local.get(&kebabize(key)) {
            published.insert((*key).to_string(), value.clone());
        }
    }

    if settings.dg_pass_frontmatter {
        published.insert("dgPassFrontmatter".into(), JsonValue::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fm(value: JsonValue) -> Frontmatter {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn minimal_block_without_local_metadata() {
        let out = normalize(None, &NoteSettings::default(), "Daily Notes/My Day.md");
        assert_eq!(
            JsonValue::Object(out),
            json!({
                "title": "My Day",
                "dg-publish": true,
                "permalink": "/daily-notes/my-day/"
            })
        );
    }

    #[test]
    fn explicit_permalink_is_wrapped_in_slashes() {
        let local = fm(json!({"dg-permalink": "about", "title": "About me"}));
        let out = normalize(Some(&local), &NoteSettings::default(), "x/About.md");

        assert_eq!(out["title"], json!("About me"));
        assert_eq!(out["dg-permalink"], json!("about"));
        assert_eq!(out["permalink"], json!("/about/"));

        let local = fm(json!({"dg-permalink": "/already/"}));
        let out = normalize(Some(&local), &NoteSettings::default(), "x.md");
        assert_eq!(out["permalink"], json!("/already/"));
    }

    #[test]
    fn home_tag_added_to_scalar_list_or_nothing() {
        let settings = NoteSettings::default();

        let out = normalize(Some(&fm(json!({"dg-home": true}))), &settings, "i.md");
        assert_eq!(out["tags"], json!(["gardenEntry"]));

        let out = normalize(Some(&fm(json!({"dg-home": true, "tags": "a"}))), &settings, "i.md");
        assert_eq!(out["tags"], json!(["a", "gardenEntry"]));

        let out = normalize(
            Some(&fm(json!({"dg-home": true, "tags": ["a", "b"]}))),
            &settings,
            "i.md",
        );
        assert_eq!(out["tags"], json!(["a", "b", "gardenEntry"]));

        let out = normalize(Some(&fm(json!({"tags": ["a"]}))), &settings, "i.md");
        assert!(out.get("tags").is_none());
    }

    #[test]
    fn kebab_overrides_copied_under_canonical_names() {
        let local = fm(json!({"dg-show-backlinks": true, "dg-show-toc": false, "other": 1}));
        let out = normalize(Some(&local), &NoteSettings::default(), "n.md");

        assert_eq!(out["dgShowBacklinks"], json!(true));
        assert_eq!(out["dgShowToc"], json!(false));
        assert!(out.get("other").is_none());
        assert!(out.get("dg-show-backlinks").is_none());
    }

    #[test]
    fn pass_frontmatter_merges_local_keys_and_drops_position() {
        let settings = NoteSettings {
            dg_pass_frontmatter: true,
            ..Default::default()
        };
        let local = fm(json!({
            "author": "me",
            "title": "Kept",
            "permalink": "/ignored/",
            "position": {"start": 0}
        }));
        let out = normalize(Some(&local), &settings, "Notes/N.md");

        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["author", "title", "permalink", "dg-publish", "dgPassFrontmatter"]
        );
        assert_eq!(out["permalink"], json!("/notes/n/"));
        assert_eq!(out["title"], json!("Kept"));
    }

    #[test]
    fn per_note_pass_frontmatter_override() {
        let local = fm(json!({"dg-pass-frontmatter": true, "author": "me"}));
        let out = normalize(Some(&local), &NoteSettings::default(), "n.md");
        assert_eq!(out["author"], json!("me"));
    }
}
