//! Local storage for the submitted chain configuration.
//!
//! The created chain lives in `~/.jbct/chain.json` as camelCase JSON, the
//! same shape the web client keeps under its `chainConfig` storage key.

use std::path::{Path, PathBuf};

use jbct_core::chain::ChainConfig;

use crate::config::state_dir;

#[derive(Debug, Clone)]
pub struct ChainStore {
    path: PathBuf,
}

impl ChainStore {
    /// Store at `~/.jbct/chain.json`.
    pub fn default_location() -> anyhow::Result<Self> {
        let dir = state_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        Ok(Self::at(dir.join("chain.json")))
    }

    pub const fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored configuration, `None` when nothing was created yet.
    pub fn load(&self) -> anyhow::Result<Option<ChainConfig>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Stored chain at {} is corrupt: {e}", self.path.display())
        })?;
        Ok(Some(config))
    }

    /// Replace the stored configuration.
    pub fn save(&self, config: &ChainConfig) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(config)?)?;
        Ok(())
    }
}
