//! Versioned content cache for Segue.
//!
//! The [`ContentManager`] owns one immutable [`VersionCache`] per content
//! version. A cache is built on first request by parsing every `.json` file
//! of the version in parallel, qualifying ids by their position in the tree,
//! flattening every node into an id map, and collecting tags. The search
//! index is then populated from the cache and referential integrity checked,
//! with every problem recorded in a [`ProblemRegistry`](segue_diagnostics::ProblemRegistry)
//! instead of failing the build.
//!
//! On top of the manager, [`IndexManager`] keeps named aliases such as
//! `latest` pointing at versions, [`NewVersionIndexer`] indexes new versions
//! on a background thread, and [`ContentSynchroniser`] drives a one-shot
//! synchronisation.

#![warn(missing_docs)]

pub mod augment;
pub mod bridge;
pub mod build;
pub mod error;
pub mod etl;
pub mod integrity;
pub mod manager;
pub mod sync;

pub use build::VersionCache;
pub use error::{CacheError, EtlError};
pub use etl::{IndexManager, NewVersionIndexer};
pub use integrity::IntegrityReport;
pub use manager::ContentManager;
pub use sync::{ContentSynchroniser, SyncOutcome};
