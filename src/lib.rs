//! Bodega - local app-store catalog resolution and install orchestration
//!
//! Bodega ingests a repository that is already materialized on local
//! storage (an `index-v1.json` document plus per-app icon assets and APKs),
//! resolves each catalog entry's presentation against a locale-preference
//! chain, filters by install category and against already-installed
//! packages, and drives batches of installs through an external installer
//! while broadcasting per-package lifecycle events to registered listeners.
//!
//! The two load-bearing pieces are [`catalog::CatalogResolver`] and
//! [`install::InstallOrchestrator`]; everything else is data model and
//! collaborator seams.

pub mod catalog;
pub mod config;
pub mod error;
pub mod install;
pub mod packages;

pub use error::CatalogError;
