//! One-shot synchronisation of a content version.

use crate::manager::ContentManager;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Result of a synchronisation attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SyncOutcome {
    /// The version is cached and indexed.
    Ready {
        /// The synchronised version.
        version: String,
        /// Addressable nodes in the version.
        nodes: usize,
        /// Problems recorded while indexing it.
        problems: usize,
    },
    /// The version could not be made ready.
    Failed {
        /// The version attempted, if one was resolved.
        version: Option<String>,
        /// Why it failed.
        reason: String,
    },
}

impl SyncOutcome {
    /// Returns `true` for [`SyncOutcome::Ready`].
    pub fn is_ready(&self) -> bool {
        matches!(self, SyncOutcome::Ready { .. })
    }
}

type Callback = Box<dyn Fn(&SyncOutcome) + Send + Sync>;

/// Brings a version, by default the newest, into the content manager.
pub struct ContentSynchroniser {
    manager: Arc<ContentManager>,
    on_complete: Option<Callback>,
}

impl ContentSynchroniser {
    /// Creates a synchroniser with no completion callback.
    pub fn new(manager: Arc<ContentManager>) -> Self {
        Self {
            manager,
            on_complete: None,
        }
    }

    /// Sets a callback invoked with every outcome.
    pub fn with_callback(mut self, callback: impl Fn(&SyncOutcome) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Synchronises `version`, or the newest version from the remote when
    /// `None`.
    pub fn synchronise(&self, version: Option<&str>) -> SyncOutcome {
        let outcome = self.attempt(version);
        match &outcome {
            SyncOutcome::Ready { version, nodes, .. } => {
                info!(version = %version, nodes, "content synchronised")
            }
            SyncOutcome::Failed { version, reason } => {
                error!(version = version.as_deref(), reason = %reason, "content synchronisation failed")
            }
        }
        if let Some(callback) = &self.on_complete {
            callback(&outcome);
        }
        outcome
    }

    fn attempt(&self, version: Option<&str>) -> SyncOutcome {
        let version = match version {
            Some(v) => v.to_string(),
            None => match self.manager.latest_version_id() {
                Ok(v) => v,
                Err(e) => {
                    return SyncOutcome::Failed {
                        version: None,
                        reason: e.to_string(),
                    }
                }
            },
        };

        if !self.manager.is_valid_version(&version) {
            return SyncOutcome::Failed {
                reason: format!("version '{version}' does not exist"),
                version: Some(version),
            };
        }
        if !self.manager.ensure_cache(&version) {
            return SyncOutcome::Failed {
                reason: format!("version '{version}' could not be indexed"),
                version: Some(version),
            };
        }

        let nodes = self.manager.cache(&version).map_or(0, |c| c.len());
        let problems = self.manager.problems().problem_count(&version);
        SyncOutcome::Ready {
            version,
            nodes,
            problems,
        }
    }
}
