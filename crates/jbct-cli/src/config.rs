//! CLI configuration management.
//!
//! Persists the backend URL, API key and session token to `~/.jbct/config.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Persistent CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Backend base URL (e.g., "<http://localhost:3001>").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Value sent in the `x-api-key` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Session token copied from the `auth_token` cookie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

/// Path to the state directory: `~/.jbct/`.
pub fn state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".jbct"))
}

impl CliConfig {
    /// Path to the config file: `~/.jbct/config.json`.
    pub fn config_path() -> Option<PathBuf> {
        state_dir().map(|d| d.join("config.json"))
    }

    /// Load config from disk. Returns default if file doesn't exist or is invalid.
    pub fn load() -> Self {
        Self::config_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path =
            Self::config_path().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Clear the stored session token.
    pub fn clear_session(&mut self) {
        self.session_token = None;
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_empty() {
        let cfg = CliConfig::default();
        assert!(cfg.api_url.is_none());
        assert!(cfg.session_token.is_none());
        assert_eq!(serde_json::to_string(&cfg).unwrap(), "{}");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = CliConfig {
            api_url: Some("http://localhost:3001".into()),
            api_key: Some("k".into()),
            session_token: Some("tok".into()),
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(CliConfig::load_from(&path), cfg);
    }

    #[test]
    fn unreadable_config_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(CliConfig::load_from(&path), CliConfig::default());

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(CliConfig::load_from(&path), CliConfig::default());
    }

    #[test]
    fn clear_session_keeps_connection_settings() {
        let mut cfg = CliConfig {
            api_url: Some("http://a".into()),
            api_key: Some("k".into()),
            session_token: Some("tok".into()),
        };
        cfg.clear_session();
        assert!(cfg.session_token.is_none());
        assert_eq!(cfg.api_url.as_deref(), Some("http://a"));
    }
}
