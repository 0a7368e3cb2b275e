//! Version-namespaced search over content documents.
//!
//! The [`SearchIndex`] trait is the seam to an external search engine: each
//! content version gets its own index, documents are stored as JSON under a
//! document type and id, and callers query by exact term or by fuzzy text.
//! [`MemorySearchIndex`] is the in-process implementation.

#![warn(missing_docs)]

pub mod error;
pub mod index;
pub mod memory;

pub use error::SearchError;
pub use index::{SearchHit, SearchIndex};
pub use memory::MemorySearchIndex;
