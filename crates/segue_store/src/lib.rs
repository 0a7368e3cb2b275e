//! Access to immutable content snapshots, one per version.
//!
//! A version is identified by a commit SHA. The [`VersionStore`] trait is the
//! only view the rest of Segue has of the repository: whether a version
//! exists, which files it contains, and when it was committed.
//! [`MemoryVersionStore`] backs tests; [`DirectoryVersionStore`] serves
//! exported snapshots laid out as one directory per SHA.

#![warn(missing_docs)]

pub mod directory;
pub mod error;
pub mod memory;
pub mod store;

pub use directory::DirectoryVersionStore;
pub use error::StoreError;
pub use memory::MemoryVersionStore;
pub use store::{TreeEntry, VersionStore};
