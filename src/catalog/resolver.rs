//! Catalog resolution
//!
//! Turns the raw index document into an ordered sequence of display-ready
//! [`CatalogEntry`] values: applies the category policy, resolves locale
//! and icon fallbacks, and drops entries whose package is already
//! installed. Document order is preserved end to end; it is the display
//! order and is never re-sorted.
//!
//! Resolution does file I/O and runs on the blocking pool; callers get the
//! result either as one `Vec` or streamed entry-by-entry over a channel.

use anyhow::{ensure, Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::entry::CatalogEntry;
use super::index::{AppRecord, RepoIndex};
use super::locale;
use super::policy::{self, CategoryDecision};
use crate::error::CatalogError;

/// Well-known fallback icon at the repository root
pub const FALLBACK_ICON: &str = "fallback-icon.png";

/// Subdirectory holding repo-wide (unlocalized) app icons
const ICON_DIR: &str = "icons-640";

/// Resolves the local repository into catalog entries.
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    repo_path: PathBuf,
    locale_preferences: Vec<String>,
}

impl CatalogResolver {
    pub fn new(repo_path: impl Into<PathBuf>, locale_preferences: Vec<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            locale_preferences,
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Pre-flight structural check of the index document.
    pub fn check_repo(&self) -> Result<(), CatalogError> {
        RepoIndex::load(&self.repo_path).map(|_| ())
    }

    /// Resolve the whole catalog into a vector, off the caller's task.
    pub async fn resolve(
        &self,
        category: &str,
        installed: &HashSet<String>,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let resolver = self.clone();
        let category = category.to_string();
        let installed = installed.clone();

        tokio::task::spawn_blocking(move || {
            let mut entries = Vec::new();
            resolver.resolve_blocking(&category, &installed, &mut |entry| {
                entries.push(entry);
                true
            })?;
            Ok(entries)
        })
        .await
        .expect("catalog resolution task panicked")
    }

    /// Resolve incrementally, delivering each entry over `tx` as soon as it
    /// is ready. Delivery order equals index document order. Stops early if
    /// the receiver goes away.
    pub async fn resolve_streaming(
        &self,
        category: &str,
        installed: &HashSet<String>,
        tx: mpsc::Sender<CatalogEntry>,
    ) -> Result<(), CatalogError> {
        let resolver = self.clone();
        let category = category.to_string();
        let installed = installed.clone();

        tokio::task::spawn_blocking(move || {
            resolver.resolve_blocking(&category, &installed, &mut |entry| {
                tx.blocking_send(entry).is_ok()
            })
        })
        .await
        .expect("catalog resolution task panicked")
    }

    /// Synchronous resolution pass. `sink` returns `false` to stop early.
    ///
    /// Fails fast on document-level problems; a malformed individual app
    /// record is logged and skipped without disturbing its siblings.
    fn resolve_blocking(
        &self,
        category: &str,
        installed: &HashSet<String>,
        sink: &mut dyn FnMut(CatalogEntry) -> bool,
    ) -> Result<(), CatalogError> {
        let index = RepoIndex::load(&self.repo_path)?;
        let mut seen: HashSet<String> = HashSet::new();

        debug!(
            apps = index.apps.len(),
            category, "resolving catalog from {:?}", self.repo_path
        );

        for value in &index.apps {
            let entry = match self.resolve_record(category, value, &index) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    warn!("skipping app record: {e:#}");
                    continue;
                }
            };

            if installed.contains(entry.package_name()) {
                debug!("{} already installed, omitting", entry.package_name());
                continue;
            }
            if !seen.insert(entry.package_name().to_string()) {
                warn!("duplicate package {} in index, omitting", entry.package_name());
                continue;
            }

            if !sink(entry) {
                return Ok(());
            }
        }

        Ok(())
    }

    /// Resolve one app record, or `None` when the category policy excludes it.
    fn resolve_record(
        &self,
        category: &str,
        value: &serde_json::Value,
        index: &RepoIndex,
    ) -> Result<Option<CatalogEntry>> {
        let app: AppRecord =
            serde_json::from_value(value.clone()).context("malformed app record")?;

        let build = index.first_build(&app.package_name)?;
        ensure!(
            !build.apk_name.is_empty(),
            "empty apkName for {}",
            app.package_name
        );

        let selected = match policy::categorize(category, &app.categories) {
            CategoryDecision::IncludeSelected => true,
            CategoryDecision::IncludeUnselected => false,
            CategoryDecision::Exclude => return Ok(None),
        };

        let mut name = app.name.clone().unwrap_or_default();
        let mut summary = app.summary.clone().unwrap_or_default();
        let mut description = app
            .description
            .as_deref()
            .map(locale::format_description)
            .unwrap_or_default();
        let mut author = app.author_name.clone().unwrap_or_default();
        let mut icon_path = app
            .icon
            .as_deref()
            .map(|icon| self.repo_path.join(ICON_DIR).join(icon));

        if let Some(localized) = &app.localized {
            // One chain per record, reused for every field.
            let locales = locale::select_locales(localized, &self.locale_preferences);

            if let Some((_, v)) = locale::lookup(localized, &locales, |f| f.name.as_deref()) {
                name = v.to_string();
            }
            if let Some((_, v)) = locale::lookup(localized, &locales, |f| f.summary.as_deref()) {
                summary = v.to_string();
            }
            if let Some((_, v)) = locale::lookup(localized, &locales, |f| f.description.as_deref())
            {
                description = locale::format_description(v);
            }
            if let Some((_, v)) = locale::lookup(localized, &locales, |f| f.author_name.as_deref())
            {
                author = v.to_string();
            }
            if let Some((tag, v)) = locale::lookup(localized, &locales, |f| f.icon.as_deref()) {
                // Localized icons live under <repo>/<package>/<locale>/.
                icon_path = Some(self.repo_path.join(&app.package_name).join(tag).join(v));
            }
        }

        // A missing icon never fails the entry; fall back to the repo-wide one.
        let icon_path = match icon_path {
            Some(path) if path.is_file() => path,
            _ => self.repo_path.join(FALLBACK_ICON),
        };

        Ok(Some(CatalogEntry::new(
            app.package_name,
            build.apk_name,
            name,
            summary,
            description,
            author,
            app.categories,
            icon_path,
            selected,
        )))
    }
}
