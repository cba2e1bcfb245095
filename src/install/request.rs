//! Install units of work and their lifecycle events

use crate::catalog::CatalogEntry;

/// One package to install, identified by its artifact filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub apk_name: String,
    pub package_name: String,
}

impl InstallRequest {
    pub fn new(apk_name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            apk_name: apk_name.into(),
            package_name: package_name.into(),
        }
    }
}

impl From<&CatalogEntry> for InstallRequest {
    fn from(entry: &CatalogEntry) -> Self {
        Self::new(entry.apk_name(), entry.package_name())
    }
}

/// A lifecycle event for one install artifact.
///
/// Listeners correlate events back to their own state by `apk_name` string
/// equality; no other payload is carried. For one artifact, `Started`
/// always precedes its terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Started { apk_name: String },
    Succeeded { apk_name: String },
    Failed { apk_name: String },
}

impl InstallOutcome {
    /// The artifact this event applies to.
    pub fn apk_name(&self) -> &str {
        match self {
            InstallOutcome::Started { apk_name }
            | InstallOutcome::Succeeded { apk_name }
            | InstallOutcome::Failed { apk_name } => apk_name,
        }
    }

    /// `Succeeded` and `Failed` end an artifact's lifecycle.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InstallOutcome::Started { .. })
    }
}
