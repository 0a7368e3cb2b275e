//! Error types for version store access.

use std::path::PathBuf;

/// Errors raised by a [`VersionStore`](crate::VersionStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested version does not exist.
    #[error("unknown version '{0}'")]
    UnknownVersion(String),

    /// The version exists but the path does not.
    #[error("'{path}' does not exist in version '{version}'")]
    MissingObject {
        /// The version searched.
        version: String,
        /// The path that was not found.
        path: String,
    },

    /// The store holds no versions at all.
    #[error("the store contains no versions")]
    Empty,

    /// An I/O error while reading a snapshot.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The file or directory being read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}
