//! Population of a version's search index from its cache.

use crate::build::VersionCache;
use crate::error::CacheError;
use segue_search::SearchIndex;
use tracing::{debug, info, warn};

/// Document type under which content nodes are indexed.
pub const CONTENT_DOC_TYPE: &str = "content";

/// Indexes every node of a cache, unless the version already has an index.
///
/// Returns the number of documents indexed. A node that fails to serialise
/// or is rejected by the index is logged and skipped.
pub fn build_search_index(index: &dyn SearchIndex, cache: &VersionCache) -> Result<usize, CacheError> {
    let version = cache.version();
    if index.has_index(version) {
        debug!(version, "search index already present");
        return Ok(0);
    }

    info!(version, nodes = cache.len(), "building search index");
    index.create_index(version)?;
    let mut indexed = 0;
    for id in cache.ids() {
        let Some(node) = cache.get(id) else {
            continue;
        };
        let json = match node.to_canonical_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(version, id, error = %e, "unable to serialise content for indexing");
                continue;
            }
        };
        match index.index_document(version, CONTENT_DOC_TYPE, &json, id) {
            Ok(()) => indexed += 1,
            Err(e) => warn!(version, id, error = %e, "search index rejected document"),
        }
    }
    info!(version, indexed, "search index built");
    Ok(indexed)
}
