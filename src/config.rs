//! Configuration loading
//!
//! A small TOML file tells the CLI where the repository lives, which
//! locales to prefer, how to invoke the platform installer, and where the
//! per-profile package lists are. Everything has a default except the
//! repository path.
//!
//! ```toml
//! repo_path = "/var/lib/bodega/repo"
//! locales = ["de-DE", "en-US"]
//! installed_lists = ["/var/lib/bodega/packages-owner.list"]
//!
//! [installer]
//! command = ["pm", "install", "{apk}"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::catalog::locale;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root of the materialized repository (holds `index-v1.json`)
    pub repo_path: PathBuf,

    /// Preferred locale chain; defaults to the host environment's locale
    #[serde(default = "locale::system_locales")]
    pub locales: Vec<String>,

    /// Newline-separated package lists, one per user profile
    #[serde(default)]
    pub installed_lists: Vec<PathBuf>,

    #[serde(default)]
    pub installer: InstallerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallerConfig {
    /// Argv template; `{apk}` and `{package}` are substituted per request
    pub command: Vec<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            command: vec!["pm".to_string(), "install".to_string(), "{apk}".to_string()],
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {path:?}"))?;
        toml::from_str(&content).with_context(|| format!("failed to parse config {path:?}"))
    }

    /// Config pointing at a repo with everything else defaulted.
    pub fn for_repo(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            locales: locale::system_locales(),
            installed_lists: Vec::new(),
            installer: InstallerConfig::default(),
        }
    }
}
