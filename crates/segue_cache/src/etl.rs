//! Named version aliases and background indexing of new versions.
//!
//! Aliases such as `latest` map a stable name onto a content version and are
//! persisted to a small TOML file so they survive restarts. Adding an alias
//! indexes its version first; any number of additions may run together, but
//! the sweep that evicts unaliased versions needs exclusive access and is
//! skipped while an addition is in flight.

use crate::error::EtlError;
use crate::manager::ContentManager;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock, TryLockError};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

/// Maintains named aliases onto indexed content versions.
pub struct IndexManager {
    manager: Arc<ContentManager>,
    aliases_file: PathBuf,
    latest_alias: String,
    aliases: Mutex<BTreeMap<String, String>>,
    gate: RwLock<()>,
}

impl IndexManager {
    /// Creates a manager, reading existing aliases from `aliases_file` if it
    /// exists.
    pub fn load(
        manager: Arc<ContentManager>,
        aliases_file: impl Into<PathBuf>,
        latest_alias: impl Into<String>,
    ) -> Result<Self, EtlError> {
        let aliases_file = aliases_file.into();
        let aliases = read_aliases(&aliases_file)?;
        debug!(count = aliases.len(), "loaded version aliases");
        Ok(Self {
            manager,
            aliases_file,
            latest_alias: latest_alias.into(),
            aliases: Mutex::new(aliases),
            gate: RwLock::new(()),
        })
    }

    /// Indexes every aliased version. Returns how many are ready.
    ///
    /// Versions that fail to index keep their alias and are logged.
    pub fn restore(&self) -> usize {
        let versions: BTreeSet<String> = self.aliases().into_values().collect();
        versions
            .iter()
            .filter(|version| {
                let ready = self.manager.ensure_cache(version);
                if !ready {
                    error!(version = %version, "aliased version could not be indexed");
                }
                ready
            })
            .count()
    }

    /// Indexes `version` and points `alias` at it.
    pub fn set_named_version(&self, alias: &str, version: &str) -> Result<(), EtlError> {
        let _adding = self.gate.read().unwrap_or_else(|e| e.into_inner());
        if !self.manager.ensure_cache(version) {
            return Err(EtlError::IndexFailed(version.to_string()));
        }
        // Written under the lock so concurrent updates reach the file in order.
        let mut aliases = self.lock_aliases();
        aliases.insert(alias.to_string(), version.to_string());
        write_aliases(&self.aliases_file, &aliases)?;
        drop(aliases);
        info!(alias, version, "version alias updated");
        Ok(())
    }

    /// Returns the version an alias points at.
    pub fn named_version(&self, alias: &str) -> Option<String> {
        self.lock_aliases().get(alias).cloned()
    }

    /// Returns the version the `latest` alias points at.
    pub fn latest_version(&self) -> Option<String> {
        self.named_version(&self.latest_alias)
    }

    /// Returns the name of the alias tracking the newest version.
    pub fn latest_alias(&self) -> &str {
        &self.latest_alias
    }

    /// Returns a snapshot of every alias.
    pub fn aliases(&self) -> BTreeMap<String, String> {
        self.lock_aliases().clone()
    }

    /// Evicts every cached version no alias points at.
    ///
    /// Returns the number evicted, or `None` if the sweep was skipped because
    /// an alias was being added.
    pub fn delete_unaliased_versions(&self) -> Option<usize> {
        let _sweeping = match self.gate.try_write() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                warn!("versions are being indexed; skipping eviction sweep");
                return None;
            }
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };
        let keep: BTreeSet<String> = self.aliases().into_values().collect();
        let mut evicted = 0;
        for version in self.manager.cached_versions() {
            if !keep.contains(&version) {
                self.manager.clear_cache(&version);
                evicted += 1;
            }
        }
        if evicted > 0 {
            info!(evicted, "evicted unaliased versions");
        }
        Some(evicted)
    }

    fn lock_aliases(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.aliases.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn read_aliases(path: &Path) -> Result<BTreeMap<String, String>, EtlError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let text = std::fs::read_to_string(path).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: AliasFile = toml::from_str(&text).map_err(|e| EtlError::AliasFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(file.aliases)
}

fn write_aliases(path: &Path, aliases: &BTreeMap<String, String>) -> Result<(), EtlError> {
    let file = AliasFile {
        aliases: aliases.clone(),
    };
    let text = toml::to_string(&file).map_err(|e| EtlError::AliasFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    std::fs::write(path, text).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Default)]
struct SlotState {
    pending: Option<String>,
    closed: bool,
}

/// A queue of capacity one where a new request replaces the waiting one.
#[derive(Default)]
struct VersionSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl VersionSlot {
    /// Offers a version. Returns the stale version it displaced, if any.
    fn offer(&self, version: &str) -> Option<String> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let stale = state.pending.replace(version.to_string());
        self.ready.notify_one();
        stale
    }

    /// Blocks until a version is offered or the slot is closed.
    fn take(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if state.closed {
                return None;
            }
            if let Some(version) = state.pending.take() {
                return Some(version);
            }
            state = self.ready.wait(state).unwrap_or_else(|e| e.into_inner());
        }
    }

    fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.closed = true;
        self.ready.notify_all();
    }
}

/// Background worker that indexes new versions and moves `latest` onto them.
///
/// Only the most recent notification matters: a notification arriving while
/// another waits replaces it. A version that fails to index is logged and the
/// worker waits for the next one.
pub struct NewVersionIndexer {
    slot: Arc<VersionSlot>,
    handle: Option<JoinHandle<()>>,
}

impl NewVersionIndexer {
    /// Starts the worker thread.
    pub fn spawn(etl: Arc<IndexManager>) -> Result<Self, EtlError> {
        let slot = Arc::new(VersionSlot::default());
        let worker_slot = Arc::clone(&slot);
        let handle = std::thread::Builder::new()
            .name("segue-indexer".to_string())
            .spawn(move || run_indexer(&etl, &worker_slot))
            .map_err(EtlError::Spawn)?;
        Ok(Self {
            slot,
            handle: Some(handle),
        })
    }

    /// Requests indexing of a new version.
    pub fn notify_new_version(&self, version: &str) {
        if let Some(stale) = self.slot.offer(version) {
            debug!(stale = %stale, version, "discarded superseded index request");
        }
    }

    /// Stops the worker after any version in progress and waits for it.
    ///
    /// A request still waiting in the queue is dropped.
    pub fn shutdown(&mut self) {
        self.slot.close();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("indexer thread panicked");
            }
        }
    }
}

impl Drop for NewVersionIndexer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_indexer(etl: &IndexManager, slot: &VersionSlot) {
    info!("indexer waiting for new versions");
    while let Some(version) = slot.take() {
        info!(version = %version, "indexing new version");
        match etl.set_named_version(etl.latest_alias(), &version) {
            Ok(()) => {
                etl.delete_unaliased_versions();
            }
            Err(e) => error!(version = %version, error = %e, "failed to index new version"),
        }
    }
    info!("indexer stopped");
}
