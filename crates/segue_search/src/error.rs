//! Error types for search index operations.

/// Errors raised by a [`SearchIndex`](crate::SearchIndex).
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// No index exists for the version.
    #[error("no search index for version '{0}'")]
    NoSuchIndex(String),

    /// A document could not be read as JSON.
    #[error("document '{id}' is not valid JSON: {reason}")]
    InvalidDocument {
        /// Id of the rejected document.
        id: String,
        /// Description from the JSON reader.
        reason: String,
    },
}
