//! A version store over exported snapshots on disk.

use crate::error::StoreError;
use crate::store::{TreeEntry, VersionStore};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;

/// A [`VersionStore`] reading snapshots laid out as `<root>/<sha>/...`.
///
/// Each immediate subdirectory of the root is one version, named by its SHA.
/// The directory's modification time stands in for the commit time.
#[derive(Clone, Debug)]
pub struct DirectoryVersionStore {
    root: PathBuf,
}

impl DirectoryVersionStore {
    /// Creates a store over the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_dir(&self, version: &str) -> Result<PathBuf, StoreError> {
        let dir = self.root.join(version);
        if is_plain_name(version) && dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::UnknownVersion(version.to_string()))
        }
    }

    /// Maps a repository path onto the snapshot, refusing paths that would
    /// leave it.
    fn object_path(&self, version: &str, path: &str) -> Result<PathBuf, StoreError> {
        let dir = self.version_dir(version)?;
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        let full = dir.join(relative);
        if contained && full.is_file() {
            Ok(full)
        } else {
            Err(StoreError::MissingObject {
                version: version.to_string(),
                path: path.to_string(),
            })
        }
    }

    fn versions_with_time(&self) -> Result<Vec<(i64, String)>, StoreError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| io_error(&self.root, e))?;
        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.root, e))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !path.is_dir() || name.starts_with('.') {
                continue;
            }
            versions.push((modified_secs(&path)?, name.to_string()));
        }
        versions.sort_by(|a, b| b.cmp(a));
        Ok(versions)
    }
}

impl VersionStore for DirectoryVersionStore {
    fn verify_commit_exists(&self, version: &str) -> bool {
        self.version_dir(version).is_ok()
    }

    fn tree_walk(&self, version: &str, suffix: &str) -> Result<Vec<TreeEntry>, StoreError> {
        let dir = self.version_dir(version)?;
        let mut files = Vec::new();
        walk_dir(&dir, &dir, suffix, &mut files)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(version, count = files.len(), "walked snapshot");
        Ok(files)
    }

    fn verify_object_exists(&self, version: &str, path: &str) -> bool {
        self.object_path(version, path).is_ok()
    }

    fn commit_time(&self, version: &str) -> Result<i64, StoreError> {
        modified_secs(&self.version_dir(version)?)
    }

    fn pull_latest_from_remote(&self) -> Result<String, StoreError> {
        self.versions_with_time()?
            .into_iter()
            .next()
            .map(|(_, v)| v)
            .ok_or(StoreError::Empty)
    }

    fn list_commits(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .versions_with_time()?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn file_bytes(&self, version: &str, path: &str) -> Result<Vec<u8>, StoreError> {
        let full = self.object_path(version, path)?;
        std::fs::read(&full).map_err(|source| StoreError::Io { path: full, source })
    }
}

fn is_plain_name(version: &str) -> bool {
    !version.is_empty()
        && !version.starts_with('.')
        && !version.contains(['/', '\\'])
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn modified_secs(path: &Path) -> Result<i64, StoreError> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| io_error(path, e))?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0))
}

/// Recursively collects files ending with `suffix`, with paths relative to
/// `base`.
fn walk_dir(
    base: &Path,
    dir: &Path,
    suffix: &str,
    files: &mut Vec<TreeEntry>,
) -> Result<(), StoreError> {
    for entry in std::fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.is_dir() {
            walk_dir(base, &path, suffix, files)?;
            continue;
        }
        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if relative.ends_with(suffix) {
            let bytes = std::fs::read(&path).map_err(|e| io_error(&path, e))?;
            files.push(TreeEntry {
                path: relative,
                bytes,
            });
        }
    }
    Ok(())
}
