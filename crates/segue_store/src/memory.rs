//! An in-memory version store.

use crate::error::StoreError;
use crate::store::{TreeEntry, VersionStore};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};

#[derive(Clone, Debug)]
struct Commit {
    version: String,
    time: i64,
    files: BTreeMap<String, Vec<u8>>,
}

/// A [`VersionStore`] holding its snapshots in memory.
///
/// Commits are added explicitly; the newest by commit time is what
/// [`pull_latest_from_remote`](VersionStore::pull_latest_from_remote) returns.
#[derive(Debug, Default)]
pub struct MemoryVersionStore {
    commits: RwLock<Vec<Commit>>,
}

impl MemoryVersionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a version made of the given `(path, contents)` files.
    pub fn add_commit<P, B>(&self, version: &str, time: i64, files: impl IntoIterator<Item = (P, B)>)
    where
        P: Into<String>,
        B: Into<Vec<u8>>,
    {
        let files = files
            .into_iter()
            .map(|(p, b)| (p.into(), b.into()))
            .collect();
        let mut commits = self.commits.write().unwrap_or_else(|e| e.into_inner());
        commits.retain(|c| c.version != version);
        commits.push(Commit {
            version: version.to_string(),
            time,
            files,
        });
    }

    fn commits(&self) -> RwLockReadGuard<'_, Vec<Commit>> {
        self.commits.read().unwrap_or_else(|e| e.into_inner())
    }

    fn with_commit<T>(
        &self,
        version: &str,
        f: impl FnOnce(&Commit) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let commits = self.commits();
        let commit = commits
            .iter()
            .find(|c| c.version == version)
            .ok_or_else(|| StoreError::UnknownVersion(version.to_string()))?;
        f(commit)
    }
}

impl VersionStore for MemoryVersionStore {
    fn verify_commit_exists(&self, version: &str) -> bool {
        self.commits().iter().any(|c| c.version == version)
    }

    fn tree_walk(&self, version: &str, suffix: &str) -> Result<Vec<TreeEntry>, StoreError> {
        self.with_commit(version, |commit| {
            Ok(commit
                .files
                .iter()
                .filter(|(path, _)| path.ends_with(suffix))
                .map(|(path, bytes)| TreeEntry {
                    path: path.clone(),
                    bytes: bytes.clone(),
                })
                .collect())
        })
    }

    fn verify_object_exists(&self, version: &str, path: &str) -> bool {
        self.with_commit(version, |commit| Ok(commit.files.contains_key(path)))
            .unwrap_or(false)
    }

    fn commit_time(&self, version: &str) -> Result<i64, StoreError> {
        self.with_commit(version, |commit| Ok(commit.time))
    }

    fn pull_latest_from_remote(&self) -> Result<String, StoreError> {
        self.commits()
            .iter()
            .max_by_key(|c| c.time)
            .map(|c| c.version.clone())
            .ok_or(StoreError::Empty)
    }

    fn list_commits(&self) -> Result<Vec<String>, StoreError> {
        let mut commits: Vec<_> = self
            .commits()
            .iter()
            .map(|c| (c.time, c.version.clone()))
            .collect();
        commits.sort_by(|a, b| b.cmp(a));
        Ok(commits.into_iter().map(|(_, v)| v).collect())
    }

    fn file_bytes(&self, version: &str, path: &str) -> Result<Vec<u8>, StoreError> {
        self.with_commit(version, |commit| {
            commit
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| StoreError::MissingObject {
                    version: version.to_string(),
                    path: path.to_string(),
                })
        })
    }
}
