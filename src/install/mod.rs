//! Install orchestration
//!
//! Batches of install requests flow through the orchestrator to an
//! injected installer backend, and lifecycle events flow back out to
//! whichever listeners are registered at delivery time.

mod backend;
mod listener;
mod orchestrator;
mod request;

pub use backend::{PackageInstaller, ProcessInstaller};
pub use listener::{InstallListener, ListenerRegistry, Subscription};
pub use orchestrator::{BatchHandle, InstallOrchestrator};
pub use request::{InstallOutcome, InstallRequest};
