//! Resolved catalog entry

use std::path::PathBuf;

/// The display-ready representation of one installable package.
///
/// Built once per index pass by the resolver. `package_name` and
/// `apk_name` identify the entry and its install artifact and never change
/// after construction; `selected` is the one field a consuming surface is
/// expected to toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    package_name: String,
    apk_name: String,

    pub name: String,
    pub summary: String,
    pub description: String,
    pub author: String,
    pub categories: Vec<String>,
    pub icon_path: PathBuf,
    pub selected: bool,
}

impl CatalogEntry {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        package_name: String,
        apk_name: String,
        name: String,
        summary: String,
        description: String,
        author: String,
        categories: Vec<String>,
        icon_path: PathBuf,
        selected: bool,
    ) -> Self {
        debug_assert!(!apk_name.is_empty());
        Self {
            package_name,
            apk_name,
            name,
            summary,
            description,
            author,
            categories,
            icon_path,
            selected,
        }
    }

    /// Unique key within one catalog
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Artifact filename used to drive installation
    pub fn apk_name(&self) -> &str {
        &self.apk_name
    }
}
