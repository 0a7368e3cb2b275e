//! Integration tests for the background indexer and version aliases.

use segue_cache::{ContentManager, IndexManager, NewVersionIndexer};
use segue_content::ContentDeserializer;
use segue_search::MemorySearchIndex;
use segue_store::MemoryVersionStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn setup(dir: &std::path::Path) -> (Arc<ContentManager>, Arc<IndexManager>) {
    let store = MemoryVersionStore::new();
    store.add_commit("v1", 1, [("a.json", r#"{"id":"a","title":"one"}"#)]);
    store.add_commit("v2", 2, [("a.json", r#"{"id":"a","title":"two"}"#)]);
    let manager = Arc::new(ContentManager::new(
        Arc::new(store),
        Arc::new(MemorySearchIndex::new()),
        ContentDeserializer::default(),
    ));
    let etl = Arc::new(
        IndexManager::load(Arc::clone(&manager), dir.join("content_indices.toml"), "latest")
            .unwrap(),
    );
    (manager, etl)
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn notification_moves_latest_and_evicts_old() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, etl) = setup(dir.path());
    let mut indexer = NewVersionIndexer::spawn(Arc::clone(&etl)).unwrap();

    indexer.notify_new_version("v1");
    assert!(wait_for(|| etl.latest_version().as_deref() == Some("v1")));

    indexer.notify_new_version("v2");
    assert!(wait_for(|| manager.cached_versions() == ["v2"]));
    assert_eq!(etl.latest_version().as_deref(), Some("v2"));
    assert_eq!(
        manager.get_by_id("v2", "a").unwrap().unwrap().title.as_deref(),
        Some("two")
    );

    indexer.shutdown();
}

#[test]
fn failed_version_does_not_stop_worker() {
    let dir = tempfile::tempdir().unwrap();
    let (_, etl) = setup(dir.path());
    let mut indexer = NewVersionIndexer::spawn(Arc::clone(&etl)).unwrap();

    indexer.notify_new_version("does-not-exist");
    indexer.notify_new_version("v2");
    assert!(wait_for(|| etl.latest_version().as_deref() == Some("v2")));

    indexer.notify_new_version("also-missing");
    indexer.notify_new_version("v1");
    assert!(wait_for(|| etl.latest_version().as_deref() == Some("v1")));
    indexer.shutdown();
}

#[test]
fn aliases_restore_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let (_, etl) = setup(dir.path());
        etl.set_named_version("latest", "v2").unwrap();
    }
    let (manager, etl) = setup(dir.path());
    assert!(manager.cached_versions().is_empty());
    assert_eq!(etl.restore(), 1);
    assert_eq!(manager.cached_versions(), ["v2"]);
}

#[test]
fn drop_stops_worker() {
    let dir = tempfile::tempdir().unwrap();
    let (_, etl) = setup(dir.path());
    let indexer = NewVersionIndexer::spawn(Arc::clone(&etl)).unwrap();
    drop(indexer);
    assert_eq!(Arc::strong_count(&etl), 1);
}
