//! The content manager: version cache lifecycle and content queries.

use crate::bridge::{build_search_index, CONTENT_DOC_TYPE};
use crate::build::{build_version_cache, VersionCache};
use crate::error::CacheError;
use crate::integrity::check_integrity;
use segue_content::{Content, ContentDeserializer};
use segue_diagnostics::{ProblemEntry, ProblemRegistry};
use segue_search::{SearchHit, SearchIndex};
use segue_store::VersionStore;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info, warn};

/// Fields searched by [`ContentManager::search_for_content`].
const FUZZY_FIELDS: &[&str] = &["id", "title", "tags", "value", "children"];
const TAGS_FIELD: &str = "tags";

type Caches = HashMap<String, Arc<VersionCache>>;

/// Owns the cache, search index and problem records of every loaded version.
///
/// Building a version is serialised per version: concurrent first requests
/// for the same version build it once, while different versions build in
/// parallel. A built cache is published whole and never mutated, so reads
/// only take the map lock long enough to clone an `Arc`.
pub struct ContentManager {
    store: Arc<dyn VersionStore>,
    index: Arc<dyn SearchIndex>,
    deserializer: ContentDeserializer,
    problems: ProblemRegistry,
    caches: RwLock<Caches>,
    build_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContentManager {
    /// Creates a manager with no versions loaded.
    pub fn new(
        store: Arc<dyn VersionStore>,
        index: Arc<dyn SearchIndex>,
        deserializer: ContentDeserializer,
    ) -> Self {
        Self {
            store,
            index,
            deserializer,
            problems: ProblemRegistry::new(),
            caches: RwLock::new(HashMap::new()),
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Makes sure a version's cache and search index exist.
    ///
    /// Builds the cache, then the search index, then checks referential
    /// integrity the first time a version is requested. If the cache exists
    /// but its index has gone, only the index is rebuilt. Returns `true` iff
    /// both exist afterwards; `false` means the version is unknown or its
    /// build failed.
    pub fn ensure_cache(&self, version: &str) -> bool {
        if self.cache(version).is_some() && self.index.has_index(version) {
            return true;
        }

        self.with_build_lock(version, || self.load(version))
    }

    fn load(&self, version: &str) -> bool {
        match self.cache(version) {
            None => {
                if !self.store.verify_commit_exists(version) {
                    warn!(version, "requested content version does not exist");
                    return false;
                }
                match self.build(version) {
                    Ok(cache) => {
                        self.caches_mut().insert(version.to_string(), cache);
                    }
                    Err(e) => {
                        error!(version, error = %e, "failed to build content version");
                        self.index.expunge_index(version);
                        self.problems.clear(version);
                        return false;
                    }
                }
            }
            Some(cache) if !self.index.has_index(version) => {
                info!(version, "search index missing; rebuilding");
                if let Err(e) = build_search_index(self.index.as_ref(), &cache) {
                    error!(version, error = %e, "failed to rebuild search index");
                }
            }
            Some(_) => {}
        }

        self.cache(version).is_some() && self.index.has_index(version)
    }

    fn build(&self, version: &str) -> Result<Arc<VersionCache>, CacheError> {
        let cache = build_version_cache(
            self.store.as_ref(),
            &self.deserializer,
            &self.problems,
            version,
        )?;
        build_search_index(self.index.as_ref(), &cache)?;
        check_integrity(&cache, self.store.as_ref(), &self.problems)?;
        Ok(Arc::new(cache))
    }

    /// Evicts one version's cache, search index and problem records.
    pub fn clear_cache(&self, version: &str) {
        self.with_build_lock(version, || {
            self.caches_mut().remove(version);
            self.index.expunge_index(version);
            self.problems.clear(version);
        });
        info!(version, "content version evicted");
    }

    /// Evicts every version.
    ///
    /// Waits for builds in progress to finish and keeps new ones from
    /// starting until the eviction is done, so no half-built index survives.
    pub fn clear_all(&self) {
        let locks = self.build_locks.lock().unwrap_or_else(|e| e.into_inner());
        let held: Vec<Arc<Mutex<()>>> = locks.values().cloned().collect();
        let _guards: Vec<MutexGuard<'_, ()>> = held
            .iter()
            .map(|lock| lock.lock().unwrap_or_else(|e| e.into_inner()))
            .collect();
        self.caches_mut().clear();
        self.index.expunge_all();
        self.problems.clear_all();
        info!("all content versions evicted");
    }

    /// Returns the cache of a version if it has been built.
    pub fn cache(&self, version: &str) -> Option<Arc<VersionCache>> {
        self.caches().get(version).cloned()
    }

    /// Returns the versions currently cached, sorted.
    pub fn cached_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.caches().keys().cloned().collect();
        versions.sort();
        versions
    }

    /// Looks up a node by qualified id, loading the version if needed.
    pub fn get_by_id(&self, version: &str, id: &str) -> Result<Option<Arc<Content>>, CacheError> {
        Ok(self.ready(version)?.get(id).cloned())
    }

    /// Searches titles, tags and text of a version, best match first.
    pub fn search_for_content(
        &self,
        version: &str,
        query: &str,
    ) -> Result<Vec<Arc<Content>>, CacheError> {
        let cache = self.ready(version)?;
        let hits = self
            .index
            .fuzzy_search(version, CONTENT_DOC_TYPE, query, FUZZY_FIELDS)?;
        Ok(resolve_hits(&cache, hits))
    }

    /// Returns the nodes carrying any of the given tags.
    pub fn get_content_by_tags(
        &self,
        version: &str,
        tags: &[String],
    ) -> Result<Vec<Arc<Content>>, CacheError> {
        let cache = self.ready(version)?;
        let hits = self
            .index
            .term_search(version, CONTENT_DOC_TYPE, TAGS_FIELD, tags)?;
        Ok(resolve_hits(&cache, hits))
    }

    /// Returns every tag used in a version.
    pub fn get_tags_list(&self, version: &str) -> Result<BTreeSet<String>, CacheError> {
        Ok(self.ready(version)?.tags().clone())
    }

    /// Lists every version in the store, newest first.
    pub fn list_available_versions(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.store.list_commits()?)
    }

    /// Returns `true` if the store knows the version.
    pub fn is_valid_version(&self, version: &str) -> bool {
        self.store.verify_commit_exists(version)
    }

    /// Orders two versions by commit time.
    pub fn compare_versions(&self, a: &str, b: &str) -> Result<Ordering, CacheError> {
        Ok(self.store.commit_time(a)?.cmp(&self.store.commit_time(b)?))
    }

    /// Fetches from the remote and returns the newest version.
    pub fn latest_version_id(&self) -> Result<String, CacheError> {
        Ok(self.store.pull_latest_from_remote()?)
    }

    /// Reads a raw file, such as an image, from a version.
    pub fn file_bytes(&self, version: &str, path: &str) -> Result<Vec<u8>, CacheError> {
        Ok(self.store.file_bytes(version, path)?)
    }

    /// Returns the problems recorded while indexing a version.
    pub fn problem_map(&self, version: &str) -> Vec<ProblemEntry> {
        self.problems.problem_map(version)
    }

    /// Returns the problem registry shared by every version.
    pub fn problems(&self) -> &ProblemRegistry {
        &self.problems
    }

    /// Returns the deserializer used for content, for parsing submissions
    /// with the same registry.
    pub fn deserializer(&self) -> &ContentDeserializer {
        &self.deserializer
    }

    fn ready(&self, version: &str) -> Result<Arc<VersionCache>, CacheError> {
        if !self.ensure_cache(version) {
            return Err(CacheError::UnknownVersion(version.to_string()));
        }
        self.cache(version)
            .ok_or_else(|| CacheError::UnknownVersion(version.to_string()))
    }

    /// Runs `f` holding the version's build lock.
    ///
    /// The lock entry is dropped again once no other caller holds it, so
    /// requests for versions that never load leave nothing behind.
    fn with_build_lock<T>(&self, version: &str, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.build_locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(version.to_string()).or_default())
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };

        let mut locks = self.build_locks.lock().unwrap_or_else(|e| e.into_inner());
        let unshared = locks
            .get(version)
            .is_some_and(|l| Arc::ptr_eq(l, &lock) && Arc::strong_count(&lock) == 2);
        if unshared {
            locks.remove(version);
        }
        result
    }

    #[cfg(test)]
    fn build_lock_count(&self) -> usize {
        self.build_locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn caches(&self) -> RwLockReadGuard<'_, Caches> {
        self.caches.read().unwrap_or_else(|e| e.into_inner())
    }

    fn caches_mut(&self) -> RwLockWriteGuard<'_, Caches> {
        self.caches.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn resolve_hits(cache: &VersionCache, hits: Vec<SearchHit>) -> Vec<Arc<Content>> {
    hits.into_iter()
        .filter_map(|hit| cache.get(&hit.id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_search::MemorySearchIndex;
    use segue_store::MemoryVersionStore;

    fn manager() -> (ContentManager, Arc<MemorySearchIndex>) {
        let store = MemoryVersionStore::new();
        store.add_commit(
            "v1",
            100,
            [
                ("a.json", r#"{"id":"a","title":"Waves","tags":["physics"]}"#),
                ("b.json", r#"{"id":"b","title":"Bonds","tags":["chemistry"]}"#),
            ],
        );
        store.add_commit("v2", 200, [("a.json", r#"{"id":"a"}"#)]);
        let index = Arc::new(MemorySearchIndex::new());
        let manager = ContentManager::new(
            Arc::new(store),
            index.clone(),
            ContentDeserializer::default(),
        );
        (manager, index)
    }

    #[test]
    fn unknown_version_is_not_cached() {
        let (manager, _) = manager();
        assert!(!manager.ensure_cache("nope"));
        assert!(manager.cached_versions().is_empty());
        assert!(matches!(
            manager.get_by_id("nope", "a"),
            Err(CacheError::UnknownVersion(_))
        ));
    }

    #[test]
    fn ensure_then_query() {
        let (manager, _) = manager();
        assert!(manager.ensure_cache("v1"));
        assert_eq!(
            manager.get_by_id("v1", "b").unwrap().unwrap().title.as_deref(),
            Some("Bonds")
        );
        assert!(manager.get_by_id("v1", "zzz").unwrap().is_none());
        assert_eq!(manager.cached_versions(), ["v1"]);
    }

    #[test]
    fn lost_index_is_rebuilt() {
        let (manager, index) = manager();
        assert!(manager.ensure_cache("v1"));
        index.expunge_index("v1");
        assert!(manager.ensure_cache("v1"));
        assert_eq!(index.document_count("v1"), 2);
    }

    #[test]
    fn clear_evicts_everything() {
        let (manager, index) = manager();
        manager.ensure_cache("v1");
        manager.ensure_cache("v2");
        manager.clear_cache("v1");
        assert_eq!(manager.cached_versions(), ["v2"]);
        assert!(!index.has_index("v1"));
        manager.clear_all();
        assert!(manager.cached_versions().is_empty());
        assert!(!index.has_index("v2"));
    }

    #[test]
    fn build_locks_do_not_accumulate() {
        let (manager, _) = manager();
        for i in 0..100 {
            assert!(!manager.ensure_cache(&format!("missing-{i}")));
        }
        assert_eq!(manager.build_lock_count(), 0);

        assert!(manager.ensure_cache("v1"));
        manager.clear_cache("v1");
        manager.clear_cache("never-loaded");
        manager.clear_all();
        assert_eq!(manager.build_lock_count(), 0);
    }

    #[test]
    fn search_and_tags() {
        let (manager, _) = manager();
        let found = manager.search_for_content("v1", "wave").unwrap();
        assert_eq!(found[0].id.as_deref(), Some("a"));

        let tagged = manager
            .get_content_by_tags("v1", &["chemistry".to_string()])
            .unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].id.as_deref(), Some("b"));

        let tags: Vec<_> = manager.get_tags_list("v1").unwrap().into_iter().collect();
        assert_eq!(tags, ["chemistry", "physics"]);
    }

    #[test]
    fn version_queries() {
        let (manager, _) = manager();
        assert_eq!(manager.latest_version_id().unwrap(), "v2");
        assert_eq!(manager.list_available_versions().unwrap(), ["v2", "v1"]);
        assert_eq!(manager.compare_versions("v1", "v2").unwrap(), Ordering::Less);
        assert!(manager.is_valid_version("v1"));
        assert!(!manager.is_valid_version("v3"));
        assert!(manager.file_bytes("v2", "a.json").is_ok());
    }
}
