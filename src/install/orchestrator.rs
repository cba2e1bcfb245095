//! Install orchestration
//!
//! Accepts batches of [`InstallRequest`], drives them through the injected
//! [`PackageInstaller`], and fans lifecycle events out to the listener
//! registry. `submit` is fire-and-forget: it returns a [`BatchHandle`]
//! immediately and the event pump runs on a spawned task.
//!
//! Per batch the orchestrator tracks only which artifacts are still
//! pending. Terminal outcomes arrive in whatever order the installer
//! finishes them; for a single artifact `Started` always precedes its
//! terminal event. A `Failed` artifact never blocks its siblings, and
//! there is no timeout or cancellation: a batch whose installer goes
//! silent stays pending.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::backend::PackageInstaller;
use super::listener::{InstallListener, ListenerRegistry, Subscription};
use super::request::{InstallOutcome, InstallRequest};

/// Drives install batches and broadcasts their lifecycle events.
pub struct InstallOrchestrator {
    repo_path: PathBuf,
    installer: Arc<dyn PackageInstaller>,
    listeners: Arc<ListenerRegistry>,
}

impl InstallOrchestrator {
    pub fn new(repo_path: impl Into<PathBuf>, installer: Arc<dyn PackageInstaller>) -> Self {
        Self {
            repo_path: repo_path.into(),
            installer,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Register a listener for all events of current and future batches.
    pub fn add_listener(&self, listener: Arc<dyn InstallListener>) -> Subscription {
        ListenerRegistry::add_listener(&self.listeners, listener)
    }

    /// The shared registry, for surfaces that hold their own reference.
    pub fn listeners(&self) -> Arc<ListenerRegistry> {
        Arc::clone(&self.listeners)
    }

    /// Submit a batch for installation.
    ///
    /// Returns immediately. An empty batch is a no-op whose handle is
    /// already complete. Duplicate artifact names within a batch are a
    /// malformed input; they collapse into one pending slot and the extra
    /// events are dropped rather than crashing.
    pub fn submit(&self, batch: Vec<InstallRequest>) -> BatchHandle {
        let total = batch.len();
        let (done_tx, done_rx) = watch::channel(batch.is_empty());

        if batch.is_empty() {
            debug!("empty install batch submitted, nothing to do");
            return BatchHandle {
                total: 0,
                done: done_rx,
            };
        }

        let mut pending: HashSet<String> =
            batch.iter().map(|r| r.apk_name.clone()).collect();
        if pending.len() < total {
            warn!("batch contains duplicate artifact names; correlation is ambiguous");
        }

        let listeners = Arc::clone(&self.listeners);
        let installer = Arc::clone(&self.installer);
        let repo_path = self.repo_path.clone();

        tokio::spawn(async move {
            info!("submitting install batch of {total}");

            let (report_tx, mut report_rx) = mpsc::unbounded_channel();

            // Every request is announced before the installer sees the batch.
            for request in &batch {
                listeners.broadcast(&InstallOutcome::Started {
                    apk_name: request.apk_name.clone(),
                });
            }

            {
                let report_tx = report_tx.clone();
                let fallback_tx = report_tx.clone();
                let requests = batch.clone();
                tokio::spawn(async move {
                    if let Err(e) = installer.install(&repo_path, &requests, report_tx).await {
                        warn!("installer dispatch failed: {e:#}");
                        // Failures are delivered, never swallowed: everything
                        // the installer left unreported fails here.
                        for request in &requests {
                            let _ = fallback_tx.send(InstallOutcome::Failed {
                                apk_name: request.apk_name.clone(),
                            });
                        }
                    }
                });
            }
            drop(report_tx);

            while let Some(outcome) = report_rx.recv().await {
                if !outcome.is_terminal() {
                    warn!("installer sent non-terminal event, ignoring: {outcome:?}");
                    continue;
                }
                if !pending.remove(outcome.apk_name()) {
                    warn!(
                        "terminal event for unknown or finished artifact {}, ignoring",
                        outcome.apk_name()
                    );
                    continue;
                }

                listeners.broadcast(&outcome);

                if pending.is_empty() {
                    break;
                }
            }

            if pending.is_empty() {
                info!("install batch of {total} complete");
                let _ = done_tx.send(true);
            } else {
                // No self-cancellation: the batch stays incomplete.
                warn!(
                    "installer stopped reporting with {} of {total} artifacts pending",
                    pending.len()
                );
            }
        });

        BatchHandle {
            total,
            done: done_rx,
        }
    }
}

/// Completion handle for one submitted batch.
pub struct BatchHandle {
    total: usize,
    done: watch::Receiver<bool>,
}

impl BatchHandle {
    /// Batch size at submission.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether every artifact has reached a terminal outcome.
    pub fn is_complete(&self) -> bool {
        *self.done.borrow()
    }

    /// Wait until the batch completes. Returns `false` if the installer
    /// went away with artifacts still pending; such a batch never
    /// completes.
    pub async fn wait(&mut self) -> bool {
        loop {
            if *self.done.borrow_and_update() {
                return true;
            }
            if self.done.changed().await.is_err() {
                return *self.done.borrow();
            }
        }
    }
}
