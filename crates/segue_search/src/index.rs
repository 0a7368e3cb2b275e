//! The search index trait.

use crate::error::SearchError;
use serde::Serialize;

/// A document matched by a query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchHit {
    /// Id of the matching document.
    pub id: String,
    /// Relevance score; higher is better.
    pub score: f64,
}

/// A store of JSON documents partitioned by version.
///
/// Implementations must be safe to share between request threads.
pub trait SearchIndex: Send + Sync {
    /// Returns `true` if an index exists for the version.
    fn has_index(&self, version: &str) -> bool;

    /// Creates an empty index for the version if none exists.
    fn create_index(&self, version: &str) -> Result<(), SearchError>;

    /// Adds or replaces a document, creating the index if needed.
    fn index_document(
        &self,
        version: &str,
        doc_type: &str,
        json: &str,
        id: &str,
    ) -> Result<(), SearchError>;

    /// Removes the index of one version. Returns `true` if it existed.
    fn expunge_index(&self, version: &str) -> bool;

    /// Removes every index.
    fn expunge_all(&self);

    /// Finds documents whose `field` equals any of `terms`.
    ///
    /// A field holding an array matches if any element equals a term.
    fn term_search(
        &self,
        version: &str,
        doc_type: &str,
        field: &str,
        terms: &[String],
    ) -> Result<Vec<SearchHit>, SearchError>;

    /// Finds documents whose `fields` approximately contain the words of
    /// `query`, best match first.
    fn fuzzy_search(
        &self,
        version: &str,
        doc_type: &str,
        query: &str,
        fields: &[&str],
    ) -> Result<Vec<SearchHit>, SearchError>;
}
