//! External installer seam
//!
//! The platform primitive that actually installs a package is injected
//! behind [`PackageInstaller`], so the orchestrator can be driven by a
//! fake in tests and by [`ProcessInstaller`] in the CLI. An implementation
//! may process requests one at a time or the whole batch as a single
//! underlying job; the only obligation is one terminal outcome per
//! submitted artifact on the report channel.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::request::{InstallOutcome, InstallRequest};

/// Asynchronous installer collaborator.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install `requests` from `repo_path`, sending exactly one
    /// `Succeeded`/`Failed` per artifact over `reports`. `Started` events
    /// are the orchestrator's responsibility, not the installer's.
    async fn install(
        &self,
        repo_path: &Path,
        requests: &[InstallRequest],
        reports: mpsc::UnboundedSender<InstallOutcome>,
    ) -> Result<()>;
}

/// Installer that spawns a configured command per artifact.
///
/// The argv template substitutes `{apk}` with the artifact's full path
/// under the repository and `{package}` with the package name, e.g.
/// `["pm", "install", "{apk}"]`. Exit success maps to `Succeeded`,
/// anything else (including a spawn failure) to `Failed`.
pub struct ProcessInstaller {
    command: Vec<String>,
}

impl ProcessInstaller {
    pub fn new(command: Vec<String>) -> Result<Self> {
        anyhow::ensure!(!command.is_empty(), "installer command is empty");
        Ok(Self { command })
    }

    fn argv_for(&self, repo_path: &Path, request: &InstallRequest) -> Vec<String> {
        let apk_path = repo_path.join(&request.apk_name);
        self.command
            .iter()
            .map(|arg| {
                arg.replace("{apk}", &apk_path.to_string_lossy())
                    .replace("{package}", &request.package_name)
            })
            .collect()
    }
}

#[async_trait]
impl PackageInstaller for ProcessInstaller {
    async fn install(
        &self,
        repo_path: &Path,
        requests: &[InstallRequest],
        reports: mpsc::UnboundedSender<InstallOutcome>,
    ) -> Result<()> {
        for request in requests {
            let argv = self.argv_for(repo_path, request);
            debug!("running installer: {argv:?}");

            let outcome = match tokio::process::Command::new(&argv[0])
                .args(&argv[1..])
                .output()
                .await
                .with_context(|| format!("failed to spawn installer for {}", request.apk_name))
            {
                Ok(output) if output.status.success() => InstallOutcome::Succeeded {
                    apk_name: request.apk_name.clone(),
                },
                Ok(output) => {
                    warn!(
                        "installer exited with {} for {}: {}",
                        output.status,
                        request.apk_name,
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                    InstallOutcome::Failed {
                        apk_name: request.apk_name.clone(),
                    }
                }
                Err(e) => {
                    warn!("{e:#}");
                    InstallOutcome::Failed {
                        apk_name: request.apk_name.clone(),
                    }
                }
            };

            // A closed channel means nobody is waiting on this batch anymore.
            if reports.send(outcome).is_err() {
                break;
            }
        }

        Ok(())
    }
}
