//! Index document parsing
//!
//! The repository index (`index-v1.json`) carries an `apps` array of app
//! records and a `packages` object mapping package names to arrays of
//! package-build records. Structural problems at the document level are
//! fatal ([`CatalogError`]); problems inside a single app record are the
//! resolver's business and are deliberately kept out of the document model,
//! so `apps` and `packages` stay as raw JSON values here and individual
//! records are deserialized one at a time.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::CatalogError;

/// Well-known index filename at the repository root
pub const INDEX_FILE: &str = "index-v1.json";

/// A structurally validated index document
#[derive(Debug, Clone)]
pub struct RepoIndex {
    /// Repository metadata block, if present
    pub repo: Option<RepoInfo>,

    /// Raw app records, in document order
    pub apps: Vec<Value>,

    /// Raw package-build arrays, keyed by package name
    pub packages: serde_json::Map<String, Value>,
}

/// Repository metadata from the `repo` block
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RepoInfo {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    /// Milliseconds since the epoch, as published by the repo generator
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// One app record, deserialized leniently from the `apps` array
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub package_name: String,

    /// Category tags; a record without them is malformed and gets skipped
    pub categories: Vec<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub author_name: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    /// Per-locale field overrides, keyed by locale tag.
    /// BTreeMap keeps language-prefix matching deterministic.
    #[serde(default)]
    pub localized: Option<BTreeMap<String, LocalizedFields>>,
}

/// The subset of localized fields the catalog presents
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedFields {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub author_name: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,
}

/// One package-build record from the `packages` map
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageBuild {
    pub apk_name: String,

    #[serde(default)]
    pub version_name: Option<String>,

    #[serde(default)]
    pub version_code: Option<i64>,
}

impl RepoIndex {
    /// Load and structurally validate the index document under `repo_path`.
    pub fn load(repo_path: &Path) -> Result<Self, CatalogError> {
        let index_path = repo_path.join(INDEX_FILE);
        let content =
            std::fs::read_to_string(&index_path).map_err(|source| CatalogError::Unavailable {
                path: index_path.clone(),
                source,
            })?;
        Self::parse(&index_path, &content)
    }

    /// Parse index content, enforcing only document-level structure:
    /// valid JSON, `apps` is an array, `packages` is an object.
    pub fn parse(index_path: &Path, content: &str) -> Result<Self, CatalogError> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| CatalogError::malformed(index_path, e.to_string()))?;

        let obj = root
            .as_object()
            .ok_or_else(|| CatalogError::malformed(index_path, "root is not an object"))?;

        let apps = obj
            .get("apps")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| CatalogError::malformed(index_path, "missing `apps` array"))?;

        let packages = obj
            .get("packages")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| CatalogError::malformed(index_path, "missing `packages` object"))?;

        let repo = obj
            .get("repo")
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        Ok(Self {
            repo,
            apps,
            packages,
        })
    }

    /// First package build for a package name.
    ///
    /// Index generators publish builds newest-first, so the first record is
    /// the one to install. Any shape problem here counts against the single
    /// app record, not the document.
    pub fn first_build(&self, package_name: &str) -> Result<PackageBuild> {
        let builds = self
            .packages
            .get(package_name)
            .and_then(Value::as_array)
            .with_context(|| format!("no package builds for {package_name}"))?;

        let first = builds
            .first()
            .with_context(|| format!("empty package build list for {package_name}"))?;

        serde_json::from_value(first.clone())
            .with_context(|| format!("malformed package build for {package_name}"))
    }
}
