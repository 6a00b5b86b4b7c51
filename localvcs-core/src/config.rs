//! Engine configuration
//!
//! Stored as `config.json` inside a repository directory. A missing file
//! means defaults.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the configuration inside a repository directory
pub const CONFIG_FILE: &str = "config.json";

/// History engine policy knobs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsConfig {
    /// Skip the push when committing a clean tree identical to the latest
    /// snapshot. Off by default: every commit is a discrete history event.
    #[serde(default)]
    pub deduplicate_commits: bool,
    /// Keep at most this many snapshots, dropping the oldest first.
    #[serde(default)]
    pub max_snapshots: Option<usize>,
}

impl VcsConfig {
    /// Reject settings the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_snapshots == Some(0) {
            return Err(anyhow!("max_snapshots must be at least 1"));
        }
        Ok(())
    }

    /// Load config from a repository path.
    pub fn load(repo_path: &Path) -> Result<Self> {
        let config_path = Self::config_file_path(repo_path);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;
        let config: VcsConfig =
            serde_json::from_str(&data).with_context(|| "Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a repository path.
    pub fn save(&self, repo_path: &Path) -> Result<()> {
        self.validate()?;
        fs::create_dir_all(repo_path)?;
        let config_path = Self::config_file_path(repo_path);
        let tmp_path = config_path.with_extension("tmp");
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &config_path)?;
        Ok(())
    }

    fn config_file_path(repo_path: &Path) -> PathBuf {
        repo_path.join(CONFIG_FILE)
    }
}
