//! Installed-package enumeration
//!
//! The host knows which packages are already present; the catalog only
//! needs the union of package names across every user profile so it can
//! hide apps that are installed anywhere on the device. The enumeration
//! is a seam so tests and other hosts can supply their own.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::debug;

/// Enumerates packages installed on the host, across all user profiles.
pub trait InstalledPackages: Send + Sync {
    fn installed_packages(&self) -> Result<HashSet<String>>;
}

/// A fixed set of package names, for tests and for hosts that already
/// computed the union themselves.
#[derive(Debug, Default, Clone)]
pub struct FixedPackageSet(pub HashSet<String>);

impl InstalledPackages for FixedPackageSet {
    fn installed_packages(&self) -> Result<HashSet<String>> {
        Ok(self.0.clone())
    }
}

/// Reads newline-separated package lists, one file per user profile, and
/// unions them. Blank lines and `#` comments are ignored.
#[derive(Debug, Clone)]
pub struct PackageListFiles {
    files: Vec<PathBuf>,
}

impl PackageListFiles {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }
}

impl InstalledPackages for PackageListFiles {
    fn installed_packages(&self) -> Result<HashSet<String>> {
        let mut packages = HashSet::new();

        for file in &self.files {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read package list {file:?}"))?;
            for line in content.lines() {
                let line = line.trim();
                if !line.is_empty() && !line.starts_with('#') {
                    packages.insert(line.to_string());
                }
            }
        }

        debug!(
            profiles = self.files.len(),
            packages = packages.len(),
            "enumerated installed packages"
        );
        Ok(packages)
    }
}
