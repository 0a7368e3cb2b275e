//! Thread-safe, version-scoped accumulator for content problems.

use crate::problem::{content_hash, ContentProblem, ProblemEntry};
use segue_common::{ContentHash, SegueResult};
use segue_content::Content;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct VersionProblems {
    by_node: HashMap<ContentHash, usize>,
    entries: Vec<ProblemEntry>,
}

/// Records problems per `(version, node)` while versions are being indexed.
///
/// Multiple threads may [`register`](Self::register) concurrently. Nodes are
/// identified by the hash of their canonical JSON, so two registrations for
/// equal nodes land in the same entry. Entries keep their first-registration
/// order.
pub struct ProblemRegistry {
    versions: RwLock<HashMap<String, VersionProblems>>,
    total: AtomicUsize,
}

impl ProblemRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            versions: RwLock::new(HashMap::new()),
            total: AtomicUsize::new(0),
        }
    }

    /// Records a problem against a node of a version.
    pub fn register(
        &self,
        version: &str,
        content: &Content,
        problem: ContentProblem,
    ) -> SegueResult<()> {
        let hash = content_hash(content)?;
        let mut versions = self.write();
        let problems = versions.entry(version.to_string()).or_default();
        match problems.by_node.get(&hash) {
            Some(&i) => problems.entries[i].problems.push(problem),
            None => {
                problems.by_node.insert(hash, problems.entries.len());
                problems.entries.push(ProblemEntry {
                    content: Arc::new(content.clone()),
                    problems: vec![problem],
                });
            }
        }
        self.total.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Returns a snapshot of every entry recorded for a version.
    pub fn problem_map(&self, version: &str) -> Vec<ProblemEntry> {
        self.read()
            .get(version)
            .map(|p| p.entries.clone())
            .unwrap_or_default()
    }

    /// Returns the number of problems recorded for a version.
    pub fn problem_count(&self, version: &str) -> usize {
        self.read()
            .get(version)
            .map(|p| p.entries.iter().map(|e| e.problems.len()).sum())
            .unwrap_or(0)
    }

    /// Returns the number of problems recorded across all versions since
    /// creation, including those later cleared.
    pub fn total_recorded(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Drops the records of one version.
    pub fn clear(&self, version: &str) {
        self.write().remove(version);
    }

    /// Drops every record.
    pub fn clear_all(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, VersionProblems>> {
        self.versions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, VersionProblems>> {
        self.versions.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ProblemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
