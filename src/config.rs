use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplanConfig {
    /// Show the oldest entry first (base on top).
    #[serde(default)]
    pub ascending: bool,

    /// Fallback filter when `REPLAN_LOG` is unset (e.g. "debug").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Author name -> avatar url.
    #[serde(default)]
    pub avatars: BTreeMap<String, String>,

    /// Ask git for commit authors when a plan is opened.
    #[serde(default = "default_true")]
    pub lookup_authors: bool,
}

impl Default for ReplanConfig {
    fn default() -> Self {
        Self {
            ascending: false,
            log_level: None,
            log_file: None,
            avatars: BTreeMap::new(),
            lookup_authors: true,
        }
    }
}

impl ReplanConfig {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "replan", "replan").map(|d| d.config_dir().join("config.json"))
    }

    /// Loads `path` (or the default location). A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        let cfg: ReplanConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(self).context("serialize config")?;
        fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}
