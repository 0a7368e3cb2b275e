//! Error types for cache and indexing operations.

use segue_common::InternalError;
use segue_search::SearchError;
use segue_store::StoreError;
use std::path::PathBuf;

/// Errors raised while building or querying a version cache.
///
/// Content problems are not errors: they are recorded in the problem registry
/// and the build carries on.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The version does not exist or could not be made ready.
    #[error("unknown or unbuildable content version '{0}'")]
    UnknownVersion(String),

    /// The version store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The search index failed.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// A broken internal invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Errors raised by version aliasing and background indexing.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    /// The alias file could not be read or written.
    #[error("alias file I/O error at {path}: {source}")]
    Io {
        /// The alias file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The alias file is not valid TOML.
    #[error("failed to parse alias file {path}: {reason}")]
    AliasFile {
        /// The alias file.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// The version could not be indexed, so it was not aliased.
    #[error("version '{0}' could not be indexed")]
    IndexFailed(String),

    /// The indexing thread could not be started.
    #[error("failed to start indexing thread: {0}")]
    Spawn(std::io::Error),
}
