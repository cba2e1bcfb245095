//! Catalog resolution
//!
//! Everything between the on-disk repository and a display-ready list of
//! installable apps:
//!
//! ```text
//! <repo>/index-v1.json ──▶ RepoIndex ──▶ CatalogResolver ──▶ [CatalogEntry]
//!                                         │
//!                                         ├─ policy    (category filter)
//!                                         ├─ locale    (field fallback)
//!                                         └─ icons     (per-app → fallback)
//! ```

mod entry;
pub mod index;
pub mod locale;
pub mod policy;
mod resolver;

pub use entry::CatalogEntry;
pub use index::{AppRecord, LocalizedFields, PackageBuild, RepoIndex, INDEX_FILE};
pub use policy::{CategoryDecision, CATEGORY_DEFAULT, CATEGORY_DEFAULT_BACKEND};
pub use resolver::{CatalogResolver, FALLBACK_ICON};
