//! Integration tests for the version cache lifecycle.
//!
//! These tests drive a `ContentManager` through concurrent first requests,
//! repeated requests and on-disk snapshots, observing the store through a
//! counting wrapper.

use segue_cache::ContentManager;
use segue_content::ContentDeserializer;
use segue_diagnostics::ProblemCode;
use segue_search::{MemorySearchIndex, SearchError, SearchHit, SearchIndex};
use segue_store::{DirectoryVersionStore, MemoryVersionStore, StoreError, TreeEntry, VersionStore};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helper: a store that counts cache builds
// ---------------------------------------------------------------------------

/// Wraps a store and counts `tree_walk` calls, which happen once per build.
struct CountingStore {
    inner: MemoryVersionStore,
    walks: AtomicUsize,
}

impl CountingStore {
    fn new(inner: MemoryVersionStore) -> Self {
        Self {
            inner,
            walks: AtomicUsize::new(0),
        }
    }

    fn walks(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }
}

impl VersionStore for CountingStore {
    fn verify_commit_exists(&self, version: &str) -> bool {
        self.inner.verify_commit_exists(version)
    }

    fn tree_walk(&self, version: &str, suffix: &str) -> Result<Vec<TreeEntry>, StoreError> {
        self.walks.fetch_add(1, Ordering::SeqCst);
        // Widen the window in which a second builder could sneak in.
        std::thread::sleep(Duration::from_millis(50));
        self.inner.tree_walk(version, suffix)
    }

    fn verify_object_exists(&self, version: &str, path: &str) -> bool {
        self.inner.verify_object_exists(version, path)
    }

    fn commit_time(&self, version: &str) -> Result<i64, StoreError> {
        self.inner.commit_time(version)
    }

    fn pull_latest_from_remote(&self) -> Result<String, StoreError> {
        self.inner.pull_latest_from_remote()
    }

    fn list_commits(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_commits()
    }

    fn file_bytes(&self, version: &str, path: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.file_bytes(version, path)
    }
}

// ---------------------------------------------------------------------------
// Helper: an index that stalls after its first document
// ---------------------------------------------------------------------------

/// Signals once the first document is indexed, then stalls so another
/// thread can act while the index is only partly built.
struct StallingIndex {
    inner: MemorySearchIndex,
    started: Mutex<Option<Sender<()>>>,
}

impl SearchIndex for StallingIndex {
    fn has_index(&self, version: &str) -> bool {
        self.inner.has_index(version)
    }

    fn create_index(&self, version: &str) -> Result<(), SearchError> {
        self.inner.create_index(version)
    }

    fn index_document(
        &self,
        version: &str,
        doc_type: &str,
        json: &str,
        id: &str,
    ) -> Result<(), SearchError> {
        self.inner.index_document(version, doc_type, json, id)?;
        if let Some(started) = self.started.lock().unwrap().take() {
            started.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(100));
        }
        Ok(())
    }

    fn expunge_index(&self, version: &str) -> bool {
        self.inner.expunge_index(version)
    }

    fn expunge_all(&self) {
        self.inner.expunge_all()
    }

    fn term_search(
        &self,
        version: &str,
        doc_type: &str,
        field: &str,
        terms: &[String],
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.inner.term_search(version, doc_type, field, terms)
    }

    fn fuzzy_search(
        &self,
        version: &str,
        doc_type: &str,
        query: &str,
        fields: &[&str],
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.inner.fuzzy_search(version, doc_type, query, fields)
    }
}

fn sample_store() -> MemoryVersionStore {
    let store = MemoryVersionStore::new();
    store.add_commit(
        "c0ffee",
        1_700_000_000,
        [
            (
                "concepts/energy.json",
                r#"{"id":"energy","type":"isaacConceptPage","title":"Energy",
                    "tags":["physics"],"relatedContent":["momentum","nowhere"],
                    "children":[{"id":"intro","value":"Energy is conserved."},
                                {"id":"fig","type":"figure","src":"figures/energy.svg"}]}"#,
            ),
            (
                "concepts/momentum.json",
                r#"{"id":"momentum","type":"isaacConceptPage","title":"Momentum","tags":["physics"]}"#,
            ),
            ("concepts/figures/energy.svg", "<svg/>"),
            ("broken.json", r#"{"id":"broken","type":"hologram"}"#),
        ],
    );
    store
}

fn manager_over(store: Arc<dyn VersionStore>) -> (Arc<ContentManager>, Arc<MemorySearchIndex>) {
    let index = Arc::new(MemorySearchIndex::new());
    let manager = Arc::new(ContentManager::new(
        store,
        index.clone(),
        ContentDeserializer::default(),
    ));
    (manager, index)
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_first_requests_build_once() {
    let store = Arc::new(CountingStore::new(sample_store()));
    let (manager, _) = manager_over(store.clone());

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let ready = manager.ensure_cache("c0ffee");
                let node = manager.get_by_id("c0ffee", "energy.intro").unwrap();
                (ready, node.is_some())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (true, true));
    }
    assert_eq!(store.walks(), 1);
}

#[test]
fn different_versions_build_independently() {
    let inner = sample_store();
    inner.add_commit("decaf", 1_700_000_100, [("a.json", r#"{"id":"a"}"#)]);
    let store = Arc::new(CountingStore::new(inner));
    let (manager, _) = manager_over(store.clone());

    let m1 = Arc::clone(&manager);
    let m2 = Arc::clone(&manager);
    let t1 = std::thread::spawn(move || m1.ensure_cache("c0ffee"));
    let t2 = std::thread::spawn(move || m2.ensure_cache("decaf"));
    assert!(t1.join().unwrap());
    assert!(t2.join().unwrap());
    assert_eq!(store.walks(), 2);
    assert_eq!(manager.cached_versions(), ["c0ffee", "decaf"]);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn ensure_cache_is_idempotent() {
    let store = Arc::new(CountingStore::new(sample_store()));
    let (manager, _) = manager_over(store.clone());

    assert!(manager.ensure_cache("c0ffee"));
    let first = manager.cache("c0ffee").unwrap();
    assert!(manager.ensure_cache("c0ffee"));
    let second = manager.cache("c0ffee").unwrap();

    assert_eq!(store.walks(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.ids(), ["energy", "energy.fig", "energy.intro", "momentum"]);
}

#[test]
fn problems_are_advisory() {
    let (manager, _) = manager_over(Arc::new(sample_store()));
    assert!(manager.ensure_cache("c0ffee"));

    let map = manager.problem_map("c0ffee");
    let codes: Vec<ProblemCode> = map
        .iter()
        .flat_map(|e| e.problems.iter().map(|p| p.code))
        .collect();
    assert_eq!(codes.len(), 2);
    assert!(codes.contains(&ProblemCode::ParseFailure));
    assert!(codes.contains(&ProblemCode::MissingReference));

    let reference = map
        .iter()
        .find(|e| e.problems[0].code == ProblemCode::MissingReference)
        .unwrap();
    assert_eq!(reference.content.id.as_deref(), Some("energy"));
    assert!(reference.problems[0].message.contains("nowhere"));
}

#[test]
fn clearing_a_version_rebuilds_on_next_request() {
    let store = Arc::new(CountingStore::new(sample_store()));
    let (manager, index) = manager_over(store.clone());

    assert!(manager.ensure_cache("c0ffee"));
    manager.clear_cache("c0ffee");
    assert!(manager.cache("c0ffee").is_none());
    assert!(!index.has_index("c0ffee"));
    assert!(manager.problem_map("c0ffee").is_empty());

    assert!(manager.ensure_cache("c0ffee"));
    assert_eq!(store.walks(), 2);
    assert_eq!(manager.problem_map("c0ffee").len(), 2);
}

#[test]
fn index_only_rebuild_does_not_reparse() {
    let store = Arc::new(CountingStore::new(sample_store()));
    let (manager, index) = manager_over(store.clone());

    assert!(manager.ensure_cache("c0ffee"));
    index.expunge_all();
    assert!(manager.ensure_cache("c0ffee"));
    assert_eq!(store.walks(), 1);
    assert_eq!(index.document_count("c0ffee"), 4);
}

#[test]
fn clear_all_during_build_leaves_no_partial_index() {
    let (tx, rx) = mpsc::channel();
    let index = Arc::new(StallingIndex {
        inner: MemorySearchIndex::new(),
        started: Mutex::new(Some(tx)),
    });
    let manager = Arc::new(ContentManager::new(
        Arc::new(sample_store()),
        index.clone(),
        ContentDeserializer::default(),
    ));

    let builder = {
        let manager = Arc::clone(&manager);
        std::thread::spawn(move || manager.ensure_cache("c0ffee"))
    };
    rx.recv().unwrap();
    manager.clear_all();
    builder.join().unwrap();

    // Whatever the interleaving, a published cache has its full index.
    match manager.cache("c0ffee") {
        Some(cache) => assert_eq!(index.inner.document_count("c0ffee"), cache.len()),
        None => assert!(!index.has_index("c0ffee")),
    }

    assert!(manager.ensure_cache("c0ffee"));
    assert_eq!(index.inner.document_count("c0ffee"), 4);
    assert!(!manager.search_for_content("c0ffee", "momentum").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// On-disk snapshots
// ---------------------------------------------------------------------------

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn directory_snapshot_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "abc123/questions/speed.json",
        r#"{"id":"speed","type":"isaacQuestionPage","title":"Average speed",
            "children":[{"id":"q","type":"isaacNumericQuestion",
                         "choices":[{"type":"quantity","value":"5","units":"m s^-1","correct":true}],
                         "hints":[{"id":"h","value":"distance over time"}]},
                        {"id":"img","type":"image","src":"missing.png"}]}"#,
    );
    let (manager, _) = manager_over(Arc::new(DirectoryVersionStore::new(tmp.path())));

    assert!(manager.ensure_cache("abc123"));
    assert!(manager.get_by_id("abc123", "speed.q.h").unwrap().is_some());
    let found = manager.search_for_content("abc123", "speed").unwrap();
    assert_eq!(found[0].id.as_deref(), Some("speed"));

    let map = manager.problem_map("abc123");
    assert_eq!(map.len(), 1);
    assert_eq!(map[0].problems[0].code, ProblemCode::MissingMedia);
    assert!(map[0].problems[0].message.contains("questions/missing.png"));
}
