//! Integration tests for install orchestration with a scripted installer

use anyhow::Result;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use bodega::install::{
    InstallListener, InstallOrchestrator, InstallOutcome, InstallRequest, PackageInstaller,
};

/// Installer that replays a fixed report sequence.
struct ScriptedInstaller {
    script: Vec<InstallOutcome>,
    fail_dispatch: bool,
}

impl ScriptedInstaller {
    fn reporting(script: Vec<InstallOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script,
            fail_dispatch: false,
        })
    }

    fn broken() -> Arc<Self> {
        Arc::new(Self {
            script: Vec::new(),
            fail_dispatch: true,
        })
    }
}

#[async_trait]
impl PackageInstaller for ScriptedInstaller {
    async fn install(
        &self,
        _repo_path: &Path,
        _requests: &[InstallRequest],
        reports: mpsc::UnboundedSender<InstallOutcome>,
    ) -> Result<()> {
        if self.fail_dispatch {
            anyhow::bail!("installer session could not be created");
        }
        for outcome in &self.script {
            let _ = reports.send(outcome.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<InstallOutcome>>,
}

impl Recorder {
    fn events(&self) -> Vec<InstallOutcome> {
        self.events.lock().unwrap().clone()
    }
}

impl InstallListener for Recorder {
    fn on_install_event(&self, outcome: &InstallOutcome) {
        self.events.lock().unwrap().push(outcome.clone());
    }
}

fn request(apk: &str) -> InstallRequest {
    InstallRequest::new(apk, format!("org.example.{}", apk.trim_end_matches(".apk")))
}

fn started(apk: &str) -> InstallOutcome {
    InstallOutcome::Started {
        apk_name: apk.to_string(),
    }
}

fn succeeded(apk: &str) -> InstallOutcome {
    InstallOutcome::Succeeded {
        apk_name: apk.to_string(),
    }
}

fn failed(apk: &str) -> InstallOutcome {
    InstallOutcome::Failed {
        apk_name: apk.to_string(),
    }
}

#[tokio::test]
async fn all_successful_batch_delivers_started_then_succeeded() {
    let batch = vec![request("a.apk"), request("b.apk"), request("c.apk")];
    let installer =
        ScriptedInstaller::reporting(vec![succeeded("a.apk"), succeeded("b.apk"), succeeded("c.apk")]);

    let orchestrator = InstallOrchestrator::new("/repo", installer);
    let recorder = Arc::new(Recorder::default());
    let _sub = orchestrator.add_listener(recorder.clone());

    let mut handle = orchestrator.submit(batch);
    assert!(handle.wait().await);
    assert!(handle.is_complete());

    let events = recorder.events();
    assert_eq!(events.len(), 6);

    // One Started and one Succeeded per artifact, Started first.
    for apk in ["a.apk", "b.apk", "c.apk"] {
        let start = events.iter().position(|e| *e == started(apk)).unwrap();
        let done = events.iter().position(|e| *e == succeeded(apk)).unwrap();
        assert!(start < done, "{apk}: Started must precede Succeeded");
    }
}

#[tokio::test]
async fn failure_does_not_block_siblings() {
    let batch = vec![request("app1.apk"), request("app2.apk")];
    // The installer finishes app2 (failing) before app1.
    let installer = ScriptedInstaller::reporting(vec![failed("app2.apk"), succeeded("app1.apk")]);

    let orchestrator = InstallOrchestrator::new("/repo", installer);
    let recorder = Arc::new(Recorder::default());
    let _sub = orchestrator.add_listener(recorder.clone());

    let mut handle = orchestrator.submit(batch);
    assert!(handle.wait().await);

    assert_eq!(
        recorder.events(),
        vec![
            started("app1.apk"),
            started("app2.apk"),
            failed("app2.apk"),
            succeeded("app1.apk"),
        ]
    );
}

#[tokio::test]
async fn empty_batch_is_a_completed_noop() {
    let orchestrator = InstallOrchestrator::new("/repo", ScriptedInstaller::reporting(Vec::new()));
    let recorder = Arc::new(Recorder::default());
    let _sub = orchestrator.add_listener(recorder.clone());

    let mut handle = orchestrator.submit(Vec::new());
    assert_eq!(handle.total(), 0);
    assert!(handle.is_complete());
    assert!(handle.wait().await);
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn dispatch_error_fails_every_pending_artifact() {
    let batch = vec![request("a.apk"), request("b.apk")];
    let orchestrator = InstallOrchestrator::new("/repo", ScriptedInstaller::broken());
    let recorder = Arc::new(Recorder::default());
    let _sub = orchestrator.add_listener(recorder.clone());

    let mut handle = orchestrator.submit(batch);
    assert!(handle.wait().await);

    assert_eq!(
        recorder.events(),
        vec![
            started("a.apk"),
            started("b.apk"),
            failed("a.apk"),
            failed("b.apk"),
        ]
    );
}

#[tokio::test]
async fn silent_installer_leaves_batch_pending() {
    // Reports nothing and returns Ok: the batch must never complete.
    let orchestrator = InstallOrchestrator::new("/repo", ScriptedInstaller::reporting(Vec::new()));
    let mut handle = orchestrator.submit(vec![request("a.apk")]);

    assert!(!handle.wait().await);
    assert!(!handle.is_complete());
}

#[tokio::test]
async fn unknown_artifact_reports_are_ignored() {
    let installer =
        ScriptedInstaller::reporting(vec![succeeded("ghost.apk"), succeeded("a.apk")]);
    let orchestrator = InstallOrchestrator::new("/repo", installer);
    let recorder = Arc::new(Recorder::default());
    let _sub = orchestrator.add_listener(recorder.clone());

    let mut handle = orchestrator.submit(vec![request("a.apk")]);
    assert!(handle.wait().await);

    assert_eq!(
        recorder.events(),
        vec![started("a.apk"), succeeded("a.apk")]
    );
}

#[tokio::test]
async fn every_registered_listener_sees_every_event() {
    let installer = ScriptedInstaller::reporting(vec![succeeded("a.apk")]);
    let orchestrator = InstallOrchestrator::new("/repo", installer);

    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());
    let _sub_a = orchestrator.add_listener(first.clone());
    let _sub_b = orchestrator.add_listener(second.clone());

    let mut handle = orchestrator.submit(vec![request("a.apk")]);
    assert!(handle.wait().await);

    assert_eq!(first.events(), second.events());
    assert_eq!(first.events().len(), 2);
}

#[tokio::test]
async fn unsubscribed_listener_receives_nothing() {
    let installer = ScriptedInstaller::reporting(vec![succeeded("a.apk")]);
    let orchestrator = InstallOrchestrator::new("/repo", installer);

    let recorder = Arc::new(Recorder::default());
    orchestrator.add_listener(recorder.clone()).unsubscribe();

    let mut handle = orchestrator.submit(vec![request("a.apk")]);
    assert!(handle.wait().await);

    // Give any stray broadcast a chance to land before asserting.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(recorder.events().is_empty());
}
