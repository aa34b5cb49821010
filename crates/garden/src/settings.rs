//! Publication settings, stored as JSON with the camelCase keys of a plugin `data.json`.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Canonical names of the per-note settings, in the order they are published.
/// A note overrides one with the kebab-case spelling (`dg-show-backlinks`).
pub const NOTE_SETTING_KEYS: &[&str] = &[
    "dgHomeLink",
    "dgPassFrontmatter",
    "dgShowBacklinks",
    "dgShowLocalGraph",
    "dgShowInlineTitle",
    "dgShowFileTree",
    "dgEnableSearch",
    "dgShowToc",
    "dgLinkPreview",
    "dgShowTags",
];

/// Site-wide defaults for the per-note settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteSettings {
    pub dg_home_link: bool,
    pub dg_pass_frontmatter: bool,
    pub dg_show_backlinks: bool,
    pub dg_show_local_graph: bool,
    pub dg_show_inline_title: bool,
    pub dg_show_file_tree: bool,
    pub dg_enable_search: bool,
    pub dg_show_toc: bool,
    pub dg_link_preview: bool,
    pub dg_show_tags: bool,
}

/// Everything the publisher needs besides the vault itself.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishSettings {
    pub github_repo: Option<String>,
    pub github_user_name: Option<String>,
    pub github_token: Option<String>,
    pub default_note_settings: NoteSettings,
}

/// Validated identity of the remote repository.
///
/// A token must be configured to obtain one. It is not carried here because
/// the directory remote takes no credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIdentity {
    pub owner: String,
    pub repo: String,
}

impl PublishSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(SettingsError::Parse)
    }

    pub async fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SettingsError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// The remote identity, or the first missing piece. Blank values count as missing.
    pub fn remote_identity(&self) -> Result<RemoteIdentity, ConfigError> {
        let repo = present(&self.github_repo).ok_or(ConfigError::MissingRepo)?;
        let owner = present(&self.github_user_name).ok_or(ConfigError::MissingUserName)?;
        present(&self.github_token).ok_or(ConfigError::MissingToken)?;
        Ok(RemoteIdentity { owner, repo })
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(String),

    #[error("Invalid settings JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plugin_style_json() {
        let settings = PublishSettings::from_json(
            r#"{
                "githubRepo": "garden",
                "githubUserName": "alice",
                "githubToken": "t0k",
                "defaultNoteSettings": { "dgShowBacklinks": true, "dgPassFrontmatter": true },
                "unrelatedKey": 3
            }"#,
        )
        .unwrap();

        assert_eq!(settings.github_repo.as_deref(), Some("garden"));
        assert!(settings.default_note_settings.dg_show_backlinks);
        assert!(settings.default_note_settings.dg_pass_frontmatter);
        assert!(!settings.default_note_settings.dg_show_toc);
    }

    #[test]
    fn every_key_names_a_setting() {
        for key in NOTE_SETTING_KEYS {
            let settings: NoteSettings = serde_json::from_str(&format!(r#"{{"{key}": true}}"#)).unwrap();
            assert_ne!(settings, NoteSettings::default(), "{key}");
        }
    }

    #[test]
    fn remote_identity_reports_first_missing_field() {
        let mut settings = PublishSettings::default();
        assert!(matches!(settings.remote_identity(), Err(ConfigError::MissingRepo)));

        settings.github_repo = Some("garden".into());
        settings.github_user_name = Some("   ".into());
        assert!(matches!(
            settings.remote_identity(),
            Err(ConfigError::MissingUserName)
        ));

        settings.github_user_name = Some("alice".into());
        assert!(matches!(settings.remote_identity(), Err(ConfigError::MissingToken)));

        settings.github_token = Some("t".into());
        let identity = settings.remote_identity().unwrap();
        assert_eq!(identity.owner, "alice");
        assert_eq!(identity.repo, "garden");
    }
}
