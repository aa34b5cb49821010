//! CLI configuration and the configuration errors raised before publishing.

use std::path::PathBuf;

/// Runtime configuration for the `garden` binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Obsidian vault root directory
    pub vault_path: PathBuf,
    /// Directory holding the published repository checkout
    pub remote_path: PathBuf,
    /// Optional settings JSON (plugin `data.json` layout)
    pub settings_path: Option<PathBuf>,
}

impl Config {
    /// Build a configuration from raw path strings (supports ~ for home directory).
    pub fn new(vault_path: &str, remote_path: &str, settings_path: Option<&str>) -> Self {
        Self {
            vault_path: expand_tilde(vault_path),
            remote_path: expand_tilde(remote_path),
            settings_path: settings_path.map(expand_tilde),
        }
    }
}

/// Expand ~ or ~/ prefix to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    }
}

/// Missing remote identity. Fatal to any write, raised before the remote is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: You need to define a GitHub repo in the plugin settings")]
    MissingRepo,
    #[error("Config error: You need to define a GitHub Username in the plugin settings")]
    MissingUserName,
    #[error("Config error: You need to define a GitHub Token in the plugin settings")]
    MissingToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_kept() {
        let config = Config::new("/vault", "/site", None);
        assert_eq!(config.vault_path, PathBuf::from("/vault"));
        assert_eq!(config.remote_path, PathBuf::from("/site"));
        assert!(config.settings_path.is_none());
    }

    #[test]
    fn tilde_expands_when_home_is_known() {
        if let Some(home) = dirs::home_dir() {
            let config = Config::new("~/vault", "~", Some("~/data.json"));
            assert_eq!(config.vault_path, home.join("vault"));
            assert_eq!(config.remote_path, home);
            assert_eq!(config.settings_path, Some(home.join("data.json")));
        }
    }
}
