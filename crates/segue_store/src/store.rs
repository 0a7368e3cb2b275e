//! The version store trait.

use crate::error::StoreError;

/// A file read from a version, with its repository-relative path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Read access to versioned content snapshots.
///
/// Implementations must be safe to share between request threads.
pub trait VersionStore: Send + Sync {
    /// Returns `true` if the version exists.
    fn verify_commit_exists(&self, version: &str) -> bool;

    /// Returns every file of a version whose path ends with `suffix`, sorted
    /// by path.
    fn tree_walk(&self, version: &str, suffix: &str) -> Result<Vec<TreeEntry>, StoreError>;

    /// Returns `true` if `path` exists in the version.
    fn verify_object_exists(&self, version: &str, path: &str) -> bool;

    /// Returns the commit time of a version in seconds since the epoch.
    fn commit_time(&self, version: &str) -> Result<i64, StoreError>;

    /// Fetches from the remote and returns the newest version.
    fn pull_latest_from_remote(&self) -> Result<String, StoreError>;

    /// Lists every known version, newest first.
    fn list_commits(&self) -> Result<Vec<String>, StoreError>;

    /// Reads one file of a version.
    fn file_bytes(&self, version: &str, path: &str) -> Result<Vec<u8>, StoreError>;
}
