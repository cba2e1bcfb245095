//! End-to-end: fixture repo through resolution into a real process installer

use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use bodega::catalog::{CatalogResolver, CATEGORY_DEFAULT};
use bodega::install::{
    InstallListener, InstallOrchestrator, InstallOutcome, InstallRequest, ProcessInstaller,
};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<InstallOutcome>>,
}

impl InstallListener for Recorder {
    fn on_install_event(&self, outcome: &InstallOutcome) {
        self.events.lock().unwrap().push(outcome.clone());
    }
}

fn fixture_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("index-v1.json"),
        r#"{
            "apps": [
                { "packageName": "org.example.a", "categories": ["Default"], "name": "A" },
                { "packageName": "org.example.b", "categories": ["DefaultBackend"], "name": "B" }
            ],
            "packages": {
                "org.example.a": [ { "apkName": "a.apk" } ],
                "org.example.b": [ { "apkName": "b.apk" } ]
            }
        }"#,
    )
    .unwrap();
    dir
}

#[tokio::test]
async fn default_view_resolves_then_installs_selected() {
    let repo = fixture_repo();
    let resolver = CatalogResolver::new(repo.path(), vec!["en-US".to_string()]);

    let entries = resolver
        .resolve(CATEGORY_DEFAULT, &HashSet::new())
        .await
        .unwrap();

    // B is a backend package: excluded outright, not merely unselected.
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].package_name(), "org.example.a");
    assert!(entries[0].selected);

    let batch: Vec<InstallRequest> = entries
        .iter()
        .filter(|e| e.selected)
        .map(InstallRequest::from)
        .collect();

    // `true` stands in for the platform installer and accepts anything.
    let installer = Arc::new(
        ProcessInstaller::new(vec!["true".to_string(), "{apk}".to_string()]).unwrap(),
    );
    let orchestrator = InstallOrchestrator::new(repo.path(), installer);

    let recorder = Arc::new(Recorder::default());
    let _sub = orchestrator.add_listener(recorder.clone());

    let mut handle = orchestrator.submit(batch);
    assert!(handle.wait().await);

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            InstallOutcome::Started {
                apk_name: "a.apk".to_string()
            },
            InstallOutcome::Succeeded {
                apk_name: "a.apk".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn failing_installer_surfaces_failure_without_aborting() {
    let repo = fixture_repo();
    let resolver = CatalogResolver::new(repo.path(), Vec::new());
    let entries = resolver
        .resolve(CATEGORY_DEFAULT, &HashSet::new())
        .await
        .unwrap();

    let installer = Arc::new(
        ProcessInstaller::new(vec!["false".to_string(), "{apk}".to_string()]).unwrap(),
    );
    let orchestrator = InstallOrchestrator::new(repo.path(), installer);

    let recorder = Arc::new(Recorder::default());
    let _sub = orchestrator.add_listener(recorder.clone());

    let mut handle = orchestrator.submit(entries.iter().map(InstallRequest::from).collect());
    assert!(handle.wait().await, "failed installs still complete the batch");

    let events = recorder.events.lock().unwrap().clone();
    assert!(events.contains(&InstallOutcome::Failed {
        apk_name: "a.apk".to_string()
    }));
}
