//! Error types shared by the store and sampler layers

use std::io;

use thiserror::Error;

use crate::store::StorePath;

/// Failure reported by a document store.
///
/// An empty collection is never an error; stores return an empty stream.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(StorePath),

    #[error("permission denied: {0}")]
    PermissionDenied(StorePath),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid path '{0}'")]
    InvalidPath(String),

    #[error("corrupt data at {path}: {reason}")]
    Corrupt { path: StorePath, reason: String },

    #[error("{0}")]
    Other(String),
}

/// Failures that abort a whole sampling run.
#[derive(Debug, Error)]
pub enum SampleError {
    /// Listing the top-level collections failed, so there is nothing to traverse.
    #[error("failed to list root collections: {0}")]
    RootEnumeration(#[source] StoreError),

    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}
