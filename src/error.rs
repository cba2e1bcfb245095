//! Catalog error types
//!
//! Only document-level failures surface as typed errors: a missing or
//! structurally invalid index aborts the whole resolution pass. Per-entry
//! malformation is logged and recovered inside the resolver, and a missing
//! icon silently falls back to the repo-wide default, so neither appears
//! here.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal, document-level catalog failures
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The index document could not be read at all
    #[error("catalog index unavailable at {path}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The index document was read but is not structurally valid
    #[error("catalog index at {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl CatalogError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CatalogError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
