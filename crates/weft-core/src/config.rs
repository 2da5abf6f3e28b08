//! Project configuration (`weft.toml`).
//!
//! Every field is defaulted, so a missing file yields a usable config.
//! CLI flags override whatever is loaded here.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Name of the per-project config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "weft.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeftConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite graph store.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Defaults for `wf load`/`wf reload` when no files are given on the
/// command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory the configured `files` are resolved against.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Event-log files to load, relative to `data_dir`.
    #[serde(default)]
    pub files: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            files: Vec::new(),
        }
    }
}

impl IngestConfig {
    /// The configured files resolved against `data_dir`.
    #[must_use]
    pub fn resolved_files(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| self.data_dir.join(f)).collect()
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".weft/graph.sqlite3")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Load `weft.toml` from `root`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns [`CoreError::ConfigParse`] when the file exists but cannot be
/// read or parsed.
pub fn load_config(root: &Path) -> Result<WeftConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(WeftConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| CoreError::ConfigParse {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    toml::from_str::<WeftConfig>(&content).map_err(|e| {
        CoreError::ConfigParse {
            path,
            reason: e.to_string(),
        }
        .into()
    })
}
